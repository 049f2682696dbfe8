//! Domain types for Weekend Wanderer
//!
//! - [`TripPreferences`] - what the user asked for (destination, vibe, budget)
//! - [`GeneratedItinerary`] - one successful generation, as persisted
//! - [`GroundingMetadata`] - place data returned alongside the generated text
//! - [`PlaceCard`] - display summary of one Maps grounding chunk

mod grounding;
mod trip;

pub use grounding::{
    GroundingChunk, GroundingMetadata, MapsChunk, NO_PLACES_TEXT, PlaceAnswerSource, PlaceCard, WebChunk,
};
pub use trip::{Budget, GeneratedItinerary, TripId, TripPreferences, Vibe, now_ms};
