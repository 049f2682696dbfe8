//! TUI state
//!
//! Everything the views need to draw a frame. Screen transitions live in the
//! [`Controller`]; this layer adds form buffers, selections, scroll offsets
//! and overlays.

use std::time::Instant;

use rand::seq::IndexedRandom;
use tracing::debug;

use crate::controller::{Controller, View};
use crate::domain::{GeneratedItinerary, TripPreferences};
use crate::form::TripForm;

/// Words shown while an itinerary is being generated
const LOADING_WORDS: &[&str] = &[
    "Scouting",
    "Mapping",
    "Wandering",
    "Packing",
    "Sightseeing",
    "Exploring",
    "Charting",
    "Daydreaming",
];

/// Spinner frames for the loading screen
pub const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Interaction mode (modal overlays)
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionMode {
    #[default]
    Normal,
    Help,
    Confirm(ConfirmDialog),
}

/// Action behind a confirmation dialog
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    DeleteTrip(String),
    Quit,
}

/// Yes/No dialog
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmDialog {
    pub message: String,
    pub action: ConfirmAction,
    pub selected_button: bool, // false = No, true = Yes
}

impl ConfirmDialog {
    pub fn new(action: ConfirmAction, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            action,
            selected_button: false,
        }
    }

    pub fn quit() -> Self {
        Self::new(
            ConfirmAction::Quit,
            "A trip is still being planned. Quit anyway?",
        )
    }

    pub fn delete_trip(trip: &GeneratedItinerary) -> Self {
        Self::new(
            ConfirmAction::DeleteTrip(trip.id.clone()),
            format!("Delete \"{}\"?", trip.title()),
        )
    }
}

/// List selection
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub selected_index: usize,
}

impl SelectionState {
    pub fn select_next(&mut self, max_items: usize) {
        if max_items > 0 && self.selected_index < max_items - 1 {
            self.selected_index += 1;
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self, max_items: usize) {
        if max_items > 0 {
            self.selected_index = max_items - 1;
        }
    }

    /// Ensure selection is within bounds
    pub fn clamp(&mut self, max_items: usize) {
        if max_items == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= max_items {
            self.selected_index = max_items - 1;
        }
    }
}

/// Main TUI application state
#[derive(Debug)]
pub struct AppState {
    pub controller: Controller,
    pub form: TripForm,
    pub interaction_mode: InteractionMode,
    pub should_quit: bool,

    // === History view ===
    pub history_selection: SelectionState,

    // === Result view ===
    pub result_scroll: u16,

    // === Request lifecycle ===
    /// Submitted preferences waiting for the runner to spawn the request
    pub pending_request: Option<TripPreferences>,
    pub loading_word: String,
    pub loading_start: Option<Instant>,
    pub spinner_frame: usize,

    /// Model name shown in the header
    pub model: String,
}

impl AppState {
    pub fn new(controller: Controller, model: impl Into<String>) -> Self {
        Self {
            controller,
            form: TripForm::new(),
            interaction_mode: InteractionMode::Normal,
            should_quit: false,
            history_selection: SelectionState::default(),
            result_scroll: 0,
            pending_request: None,
            loading_word: LOADING_WORDS[0].to_string(),
            loading_start: None,
            spinner_frame: 0,
            model: model.into(),
        }
    }

    pub fn view(&self) -> &View {
        self.controller.view()
    }

    /// Advance animations
    pub fn tick(&mut self) {
        if self.controller.in_flight() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();
        }
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER[self.spinner_frame % SPINNER.len()]
    }

    /// Submit the form through the controller and queue the request
    pub fn submit_form(&mut self) -> bool {
        debug!("AppState::submit_form: called");
        let Some(prefs) = self.form.submit() else {
            debug!("AppState::submit_form: blank destination");
            return false;
        };
        if !self.controller.submit(prefs.clone()) {
            return false;
        }

        let mut rng = rand::rng();
        self.loading_word = LOADING_WORDS.choose(&mut rng).unwrap_or(&"Planning").to_string();
        self.loading_start = Some(Instant::now());
        self.spinner_frame = 0;
        self.pending_request = Some(prefs);
        true
    }

    /// Seconds since the request started
    pub fn loading_elapsed(&self) -> u64 {
        self.loading_start.map(|s| s.elapsed().as_secs()).unwrap_or(0)
    }

    /// Reset per-view positions after a screen change
    pub fn on_view_changed(&mut self) {
        self.result_scroll = 0;
        self.history_selection.clamp(self.controller.trips().len());
        if !self.controller.in_flight() {
            self.loading_start = None;
        }
    }

    /// Trip under the history cursor
    pub fn selected_trip(&self) -> Option<&GeneratedItinerary> {
        self.controller.trips().get(self.history_selection.selected_index)
    }

    /// Trip the delete key applies to in the current view
    pub fn delete_target(&self) -> Option<&GeneratedItinerary> {
        match self.view() {
            View::Result { trip } => Some(trip),
            View::History => self.selected_trip(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TripStore;
    use tempfile::TempDir;

    fn state(temp: &TempDir) -> AppState {
        let store = TripStore::load(temp.path().join("trips.json"));
        AppState::new(Controller::new(store), "gemini-2.5-flash")
    }

    #[test]
    fn test_selection_bounds() {
        let mut sel = SelectionState::default();
        sel.select_prev();
        assert_eq!(sel.selected_index, 0);
        sel.select_next(2);
        sel.select_next(2);
        assert_eq!(sel.selected_index, 1);
        sel.clamp(0);
        assert_eq!(sel.selected_index, 0);
        sel.select_last(5);
        assert_eq!(sel.selected_index, 4);
        sel.select_first();
        assert_eq!(sel.selected_index, 0);
    }

    #[test]
    fn test_submit_form_blank_does_nothing() {
        let temp = TempDir::new().unwrap();
        let mut state = state(&temp);

        assert!(!state.submit_form());
        assert!(state.pending_request.is_none());
        assert!(matches!(state.view(), View::Form { error: None }));
    }

    #[test]
    fn test_submit_form_queues_request() {
        let temp = TempDir::new().unwrap();
        let mut state = state(&temp);
        state.form.destination = "Kyoto".to_string();

        assert!(state.submit_form());
        assert_eq!(state.pending_request.as_ref().unwrap().destination, "Kyoto");
        assert!(matches!(state.view(), View::Loading { .. }));
        assert!(LOADING_WORDS.contains(&state.loading_word.as_str()));
        assert!(state.loading_start.is_some());
    }

    #[test]
    fn test_tick_advances_spinner_only_in_flight() {
        let temp = TempDir::new().unwrap();
        let mut state = state(&temp);
        state.tick();
        assert_eq!(state.spinner_frame, 0);

        state.form.destination = "Kyoto".to_string();
        state.submit_form();
        state.tick();
        assert_eq!(state.spinner_frame, 1);
    }

    #[test]
    fn test_delete_target() {
        let temp = TempDir::new().unwrap();
        let state = state(&temp);
        assert!(state.delete_target().is_none());
    }
}
