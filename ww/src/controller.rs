//! View controller
//!
//! Owns the trip store, the current-trip selection and the single in-flight
//! request guard. The TUI and the CLI both drive their flows through here.

use tracing::{debug, info, warn};

use crate::domain::{GeneratedItinerary, TripPreferences};
use crate::planner::{Itinerary, PlanError};
use crate::store::TripStore;

/// Banner shown on the form after any failed request
pub const GENERIC_ERROR: &str = "Failed to generate itinerary. Please check your connection or API key.";

/// What the user is looking at
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Form { error: Option<String> },
    Loading { prefs: TripPreferences },
    Result { trip: GeneratedItinerary },
    History,
}

impl Default for View {
    fn default() -> Self {
        View::Form { error: None }
    }
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Form { .. } => "Plan",
            View::Loading { .. } => "Planning",
            View::Result { .. } => "Trip",
            View::History => "History",
        }
    }
}

/// State machine behind every screen
#[derive(Debug)]
pub struct Controller {
    view: View,
    current: Option<GeneratedItinerary>,
    store: TripStore,
    /// Preferences of the request in flight
    pending: Option<TripPreferences>,
}

impl Controller {
    pub fn new(store: TripStore) -> Self {
        debug!(trips = store.len(), "Controller::new: called");
        Self {
            view: View::default(),
            current: None,
            store,
            pending: None,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn current(&self) -> Option<&GeneratedItinerary> {
        self.current.as_ref()
    }

    pub fn store(&self) -> &TripStore {
        &self.store
    }

    pub fn trips(&self) -> &[GeneratedItinerary] {
        self.store.trips()
    }

    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&TripPreferences> {
        self.pending.as_ref()
    }

    /// Form -> Loading
    ///
    /// Returns false (and changes nothing) when not on the form, when the
    /// destination is blank, or while another request is in flight.
    pub fn submit(&mut self, prefs: TripPreferences) -> bool {
        debug!(destination = %prefs.destination, view = self.view.name(), "Controller::submit: called");
        if !matches!(self.view, View::Form { .. }) {
            debug!("Controller::submit: not on the form, ignoring");
            return false;
        }
        if prefs.destination.trim().is_empty() {
            debug!("Controller::submit: blank destination, ignoring");
            return false;
        }
        if self.pending.is_some() {
            debug!("Controller::submit: request already in flight, ignoring");
            return false;
        }

        info!(destination = %prefs.destination, vibe = %prefs.vibe, budget = %prefs.budget, "Planning trip");
        self.pending = Some(prefs.clone());
        self.view = View::Loading { prefs };
        true
    }

    /// Loading -> Result
    ///
    /// Applies even if the user navigated elsewhere meanwhile. Returns the
    /// stored trip, or `None` when no request was pending.
    pub fn on_success(&mut self, itinerary: Itinerary) -> Option<&GeneratedItinerary> {
        debug!(len = itinerary.text.len(), "Controller::on_success: called");
        let Some(prefs) = self.pending.take() else {
            warn!("Controller::on_success: no request pending, dropping result");
            return None;
        };

        let trip = GeneratedItinerary::new(prefs, itinerary.text, itinerary.grounding_metadata);
        info!(id = %trip.id, destination = %trip.preferences.destination, "Itinerary ready");
        self.store.append(trip.clone());
        self.current = Some(trip.clone());
        self.view = View::Result { trip };
        self.current.as_ref()
    }

    /// Loading -> Form with the generic banner
    pub fn on_failure(&mut self, err: &PlanError) {
        warn!(error = %err, "Itinerary request failed");
        if self.pending.take().is_none() {
            debug!("Controller::on_failure: no request pending");
        }
        self.view = View::Form {
            error: Some(GENERIC_ERROR.to_string()),
        };
    }

    /// Result|History -> Form
    pub fn back(&mut self) {
        debug!(view = self.view.name(), "Controller::back: called");
        if matches!(self.view, View::Result { .. } | View::History) {
            self.view = View::default();
        }
    }

    pub fn navigate_history(&mut self) {
        debug!(view = self.view.name(), "Controller::navigate_history: called");
        self.view = View::History;
    }

    /// "Plan New": back to a clean form; an in-flight request keeps running
    pub fn navigate_form(&mut self) {
        debug!(view = self.view.name(), "Controller::navigate_form: called");
        if !matches!(self.view, View::Form { .. }) {
            self.view = View::default();
        }
    }

    /// Show the current trip, if there is one
    pub fn navigate_current(&mut self) -> bool {
        debug!(view = self.view.name(), "Controller::navigate_current: called");
        match &self.current {
            Some(trip) => {
                self.view = View::Result { trip: trip.clone() };
                true
            }
            None => false,
        }
    }

    /// History -> Result for the chosen trip
    pub fn select(&mut self, id: &str) -> bool {
        debug!(%id, "Controller::select: called");
        if !matches!(self.view, View::History) {
            debug!("Controller::select: not on history, ignoring");
            return false;
        }
        let Some(trip) = self.store.get(id).cloned() else {
            warn!(%id, "Controller::select: unknown trip");
            return false;
        };

        self.current = Some(trip.clone());
        self.view = View::Result { trip };
        true
    }

    /// Delete a trip from History or Result
    ///
    /// Deleting the current trip clears the selection and returns to the
    /// form; any other deletion leaves the view alone.
    pub fn delete(&mut self, id: &str) -> bool {
        debug!(%id, view = self.view.name(), "Controller::delete: called");
        if !matches!(self.view, View::History | View::Result { .. }) {
            debug!("Controller::delete: not on history or result, ignoring");
            return false;
        }
        if !self.store.remove(id) {
            return false;
        }

        info!(%id, "Deleted trip");
        let showing = matches!(&self.view, View::Result { trip } if trip.id == id);
        let is_current = self.current.as_ref().is_some_and(|t| t.id == id);
        if is_current || showing {
            self.current = None;
            self.view = View::default();
        }
        true
    }
}
