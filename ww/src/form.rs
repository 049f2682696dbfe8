//! Preferences capture form

use tracing::debug;

use crate::domain::{Budget, TripPreferences, Vibe};

/// Focusable form fields, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Destination,
    Vibe,
    Budget,
    Submit,
}

impl FormField {
    const ORDER: [FormField; 4] = [Self::Destination, Self::Vibe, Self::Budget, Self::Submit];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Editable trip preferences
#[derive(Debug, Clone, Default)]
pub struct TripForm {
    pub destination: String,
    pub vibe: Vibe,
    pub budget: Budget,
    pub focus: FormField,
}

impl TripForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_char(&mut self, c: char) {
        self.destination.push(c);
    }

    pub fn pop_char(&mut self) {
        self.destination.pop();
    }

    pub fn clear(&mut self) {
        debug!("TripForm::clear: called");
        self.destination.clear();
    }

    pub fn next_vibe(&mut self) {
        self.vibe = self.vibe.next();
    }

    pub fn prev_vibe(&mut self) {
        self.vibe = self.vibe.prev();
    }

    pub fn next_budget(&mut self) {
        self.budget = self.budget.next();
    }

    pub fn prev_budget(&mut self) {
        self.budget = self.budget.prev();
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Whether submit would currently be accepted
    pub fn can_submit(&self) -> bool {
        !self.destination.trim().is_empty()
    }

    /// Snapshot the fields as preferences; `None` when the destination is blank
    pub fn submit(&self) -> Option<TripPreferences> {
        debug!(destination = %self.destination, "TripForm::submit: called");
        TripPreferences::new(self.destination.clone(), self.vibe, self.budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let form = TripForm::new();
        assert_eq!(form.destination, "");
        assert_eq!(form.vibe, Vibe::Relaxed);
        assert_eq!(form.budget, Budget::Moderate);
        assert_eq!(form.focus, FormField::Destination);
        assert!(!form.can_submit());
    }

    #[test]
    fn test_submit_rejects_blank_destination() {
        let mut form = TripForm::new();
        assert!(form.submit().is_none());

        for c in "   ".chars() {
            form.push_char(c);
        }
        assert!(form.submit().is_none());
    }

    #[test]
    fn test_submit_snapshots_fields() {
        let mut form = TripForm::new();
        for c in "Kyoto".chars() {
            form.push_char(c);
        }
        form.next_vibe();
        form.next_vibe();
        form.next_vibe();
        form.prev_budget();

        let prefs = form.submit().unwrap();
        assert_eq!(prefs.destination, "Kyoto");
        assert_eq!(prefs.vibe, Vibe::Culture);
        assert_eq!(prefs.budget, Budget::Budget);

        // Later edits do not touch the snapshot
        form.pop_char();
        assert_eq!(prefs.destination, "Kyoto");
        assert_eq!(form.destination, "Kyot");
    }

    #[test]
    fn test_clear() {
        let mut form = TripForm::new();
        form.push_char('X');
        form.clear();
        assert!(form.destination.is_empty());
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = TripForm::new();
        form.focus_prev();
        assert_eq!(form.focus, FormField::Submit);
        form.focus_next();
        assert_eq!(form.focus, FormField::Destination);
        form.focus_next();
        assert_eq!(form.focus, FormField::Vibe);
    }
}
