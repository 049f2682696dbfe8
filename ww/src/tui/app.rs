//! TUI application - keyboard handling
//!
//! The App struct owns the AppState and handles all keyboard events.
//! It does not do any rendering - that's delegated to the views module.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use super::state::{AppState, ConfirmAction, ConfirmDialog, InteractionMode};
use crate::controller::{Controller, View};
use crate::form::FormField;

/// Lines moved by PageUp/PageDown in the result view
const PAGE_SCROLL: u16 = 10;

/// TUI application
#[derive(Debug)]
pub struct App {
    state: AppState,
}

impl App {
    pub fn new(controller: Controller, model: impl Into<String>) -> Self {
        Self {
            state: AppState::new(controller, model),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Handle a key event
    ///
    /// Returns true if the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
            return true;
        }

        match &self.state.interaction_mode {
            InteractionMode::Normal => self.handle_normal_key(key),
            InteractionMode::Help => self.handle_help_key(key),
            InteractionMode::Confirm(_) => self.handle_confirm_key(key),
        }
        self.state.should_quit
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        // Function keys work everywhere, including while typing
        match key.code {
            KeyCode::F(1) => {
                self.state.interaction_mode = InteractionMode::Help;
                return;
            }
            KeyCode::F(2) => return self.with_view_change(Controller::navigate_form),
            KeyCode::F(3) => {
                return self.with_view_change(|c| {
                    c.navigate_current();
                });
            }
            KeyCode::F(4) => return self.with_view_change(Controller::navigate_history),
            _ => {}
        }

        match self.state.view() {
            View::Form { .. } => self.handle_form_key(key),
            View::Loading { .. } => self.handle_loading_key(key),
            View::Result { .. } => self.handle_result_key(key),
            View::History => self.handle_history_key(key),
        }
    }

    /// Keys shared by the non-typing screens
    fn handle_nav_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => self.request_quit(),
            KeyCode::Char('?') => self.state.interaction_mode = InteractionMode::Help,
            KeyCode::Char('n') => self.with_view_change(Controller::navigate_form),
            KeyCode::Char('h') => self.with_view_change(Controller::navigate_history),
            KeyCode::Char('c') => self.with_view_change(|c| {
                c.navigate_current();
            }),
            _ => return false,
        }
        true
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let form = &mut self.state.form;
        match (key.code, form.focus) {
            (KeyCode::Tab | KeyCode::Down, _) => form.focus_next(),
            (KeyCode::BackTab | KeyCode::Up, _) => form.focus_prev(),
            (KeyCode::Enter, _) => {
                if self.state.submit_form() {
                    debug!("App::handle_form_key: submitted");
                }
            }
            (KeyCode::Esc, FormField::Destination) => form.clear(),
            (KeyCode::Esc, _) => form.focus = FormField::Destination,

            (KeyCode::Char(c), FormField::Destination) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                form.push_char(c)
            }
            (KeyCode::Backspace, FormField::Destination) => form.pop_char(),

            (KeyCode::Right, FormField::Vibe) => form.next_vibe(),
            (KeyCode::Left, FormField::Vibe) => form.prev_vibe(),
            (KeyCode::Right, FormField::Budget) => form.next_budget(),
            (KeyCode::Left, FormField::Budget) => form.prev_budget(),

            _ => {
                self.handle_nav_key(key);
            }
        }
    }

    fn handle_loading_key(&mut self, key: KeyEvent) {
        self.handle_nav_key(key);
    }

    fn handle_result_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.result_scroll = self.state.result_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.result_scroll = self.state.result_scroll.saturating_add(1);
            }
            KeyCode::PageUp => {
                self.state.result_scroll = self.state.result_scroll.saturating_sub(PAGE_SCROLL);
            }
            KeyCode::PageDown | KeyCode::Char(' ') => {
                self.state.result_scroll = self.state.result_scroll.saturating_add(PAGE_SCROLL);
            }
            KeyCode::Char('g') => self.state.result_scroll = 0,
            KeyCode::Esc | KeyCode::Char('b') => self.with_view_change(Controller::back),
            KeyCode::Char('d') => self.confirm_delete(),
            _ => {
                self.handle_nav_key(key);
            }
        }
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        let count = self.state.controller.trips().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.state.history_selection.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.state.history_selection.select_next(count),
            KeyCode::Char('g') => self.state.history_selection.select_first(),
            KeyCode::Char('G') => self.state.history_selection.select_last(count),
            KeyCode::Enter => {
                if let Some(id) = self.state.selected_trip().map(|t| t.id.clone()) {
                    self.with_view_change(|c| {
                        c.select(&id);
                    });
                }
            }
            KeyCode::Esc | KeyCode::Char('b') => self.with_view_change(Controller::back),
            KeyCode::Char('d') => self.confirm_delete(),
            _ => {
                self.handle_nav_key(key);
            }
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::F(1)) {
            self.state.interaction_mode = InteractionMode::Normal;
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let InteractionMode::Confirm(dialog) = &mut self.state.interaction_mode else {
            return;
        };

        match key.code {
            KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
                dialog.selected_button = !dialog.selected_button;
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let action = dialog.action.clone();
                self.state.interaction_mode = InteractionMode::Normal;
                self.execute_confirm(action);
            }
            KeyCode::Enter => {
                let confirmed = dialog.selected_button;
                let action = dialog.action.clone();
                self.state.interaction_mode = InteractionMode::Normal;
                if confirmed {
                    self.execute_confirm(action);
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state.interaction_mode = InteractionMode::Normal;
            }
            _ => {}
        }
    }

    fn execute_confirm(&mut self, action: ConfirmAction) {
        debug!(?action, "App::execute_confirm: called");
        match action {
            ConfirmAction::DeleteTrip(id) => self.with_view_change(|c| {
                c.delete(&id);
            }),
            ConfirmAction::Quit => self.state.should_quit = true,
        }
    }

    fn confirm_delete(&mut self) {
        if let Some(dialog) = self.state.delete_target().map(ConfirmDialog::delete_trip) {
            self.state.interaction_mode = InteractionMode::Confirm(dialog);
        }
    }

    fn request_quit(&mut self) {
        if self.state.controller.in_flight() {
            self.state.interaction_mode = InteractionMode::Confirm(ConfirmDialog::quit());
        } else {
            self.state.should_quit = true;
        }
    }

    fn with_view_change(&mut self, f: impl FnOnce(&mut Controller)) {
        f(&mut self.state.controller);
        self.state.on_view_changed();
    }
}
