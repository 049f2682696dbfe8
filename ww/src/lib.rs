//! Weekend Wanderer - AI weekend trip planner
//!
//! Collects a destination, a vibe and a budget, asks Gemini for a two-day
//! itinerary grounded in Google Maps, and keeps every result in a local
//! trip history.
//!
//! # Modules
//!
//! - [`domain`] - Preferences, itineraries and grounding metadata
//! - [`form`] - Preferences capture
//! - [`planner`] - Itinerary request client
//! - [`store`] - Persisted trip history
//! - [`controller`] - View state machine
//! - [`llm`] - LLM client trait and Gemini implementation
//! - [`prompts`] - Handlebars prompt templates
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//! - [`tui`] - Terminal UI

pub mod cli;
pub mod config;
pub mod controller;
pub mod domain;
pub mod form;
pub mod llm;
pub mod planner;
pub mod prompts;
pub mod store;
pub mod tui;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use controller::{Controller, GENERIC_ERROR, View};
pub use domain::{Budget, GeneratedItinerary, GroundingMetadata, PlaceCard, TripPreferences, Vibe};
pub use form::TripForm;
pub use llm::{LlmClient, LlmError, create_client};
pub use planner::{FALLBACK_TEXT, Itinerary, ItineraryPlanner, PlanError};
pub use store::{StoreError, TripStore, decode_trips, encode_trips};
