//! Trip preferences and generated itineraries

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::grounding::{GroundingMetadata, PlaceCard};

/// Unique identifier for a generated itinerary
pub type TripId = String;

/// Current time as unix milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Trip mood selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vibe {
    #[default]
    Relaxed,
    Adventure,
    Foodie,
    Culture,
    Family,
}

impl Vibe {
    /// All vibes in display order
    pub const ALL: [Vibe; 5] = [Vibe::Relaxed, Vibe::Adventure, Vibe::Foodie, Vibe::Culture, Vibe::Family];

    /// Wire/prompt name (lowercase)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relaxed => "relaxed",
            Self::Adventure => "adventure",
            Self::Foodie => "foodie",
            Self::Culture => "culture",
            Self::Family => "family",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Relaxed => "Relaxed",
            Self::Adventure => "Adventure",
            Self::Foodie => "Foodie",
            Self::Culture => "Culture",
            Self::Family => "Family",
        }
    }

    /// Next vibe in the cycle (wraps)
    pub fn next(self) -> Self {
        debug!(?self, "Vibe::next: called");
        cycle(&Self::ALL, self, true)
    }

    /// Previous vibe in the cycle (wraps)
    pub fn prev(self) -> Self {
        debug!(?self, "Vibe::prev: called");
        cycle(&Self::ALL, self, false)
    }
}

impl FromStr for Vibe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "Vibe::from_str: called");
        match s.trim().to_lowercase().as_str() {
            "relaxed" => Ok(Self::Relaxed),
            "adventure" => Ok(Self::Adventure),
            "foodie" => Ok(Self::Foodie),
            "culture" => Ok(Self::Culture),
            "family" => Ok(Self::Family),
            _ => {
                debug!(%s, "Vibe::from_str: unknown vibe");
                Err(format!(
                    "Unknown vibe: {}. Use: relaxed, adventure, foodie, culture, or family",
                    s
                ))
            }
        }
    }
}

impl fmt::Display for Vibe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spending level selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    Budget,
    #[default]
    Moderate,
    Luxury,
}

impl Budget {
    /// All budgets in display order
    pub const ALL: [Budget; 3] = [Budget::Budget, Budget::Moderate, Budget::Luxury];

    /// Wire/prompt name (lowercase)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Moderate => "moderate",
            Self::Luxury => "luxury",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Budget => "Budget",
            Self::Moderate => "Moderate",
            Self::Luxury => "Luxury",
        }
    }

    /// Dollar-sign shorthand shown next to the label
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Budget => "$",
            Self::Moderate => "$$",
            Self::Luxury => "$$$",
        }
    }

    /// Next budget in the cycle (wraps)
    pub fn next(self) -> Self {
        debug!(?self, "Budget::next: called");
        cycle(&Self::ALL, self, true)
    }

    /// Previous budget in the cycle (wraps)
    pub fn prev(self) -> Self {
        debug!(?self, "Budget::prev: called");
        cycle(&Self::ALL, self, false)
    }
}

impl FromStr for Budget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "Budget::from_str: called");
        match s.trim().to_lowercase().as_str() {
            "budget" | "$" => Ok(Self::Budget),
            "moderate" | "$$" => Ok(Self::Moderate),
            "luxury" | "$$$" => Ok(Self::Luxury),
            _ => {
                debug!(%s, "Budget::from_str: unknown budget");
                Err(format!("Unknown budget: {}. Use: budget, moderate, or luxury", s))
            }
        }
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    let len = all.len();
    let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
    all[next]
}

/// Preferences captured from the form
///
/// Immutable once submitted. The destination is kept as typed; only the
/// emptiness check trims it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripPreferences {
    pub destination: String,
    pub vibe: Vibe,
    pub budget: Budget,
}

impl TripPreferences {
    /// Build preferences, rejecting a blank destination
    pub fn new(destination: impl Into<String>, vibe: Vibe, budget: Budget) -> Option<Self> {
        let destination = destination.into();
        debug!(%destination, ?vibe, ?budget, "TripPreferences::new: called");
        if destination.trim().is_empty() {
            debug!("TripPreferences::new: blank destination, rejecting");
            return None;
        }
        Some(Self {
            destination,
            vibe,
            budget,
        })
    }
}

/// One successful itinerary generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedItinerary {
    pub id: TripId,
    pub preferences: TripPreferences,
    /// Markdown body
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_metadata: Option<GroundingMetadata>,
    /// Creation timestamp (unix ms)
    pub created_at: i64,
}

impl GeneratedItinerary {
    /// Create a new itinerary with a fresh id and the current timestamp
    pub fn new(preferences: TripPreferences, text: String, grounding_metadata: Option<GroundingMetadata>) -> Self {
        let id = Uuid::now_v7().to_string();
        debug!(%id, destination = %preferences.destination, "GeneratedItinerary::new: called");
        Self {
            id,
            preferences,
            text,
            grounding_metadata,
            created_at: now_ms(),
        }
    }

    /// Header title, e.g. "Weekend in Kyoto"
    pub fn title(&self) -> String {
        format!("Weekend in {}", self.preferences.destination)
    }

    /// Place cards derived from Maps grounding chunks
    pub fn places(&self) -> Vec<PlaceCard> {
        self.grounding_metadata
            .as_ref()
            .map(GroundingMetadata::places)
            .unwrap_or_default()
    }

    /// First `max_chars` characters of the body followed by an ellipsis
    pub fn preview(&self, max_chars: usize) -> String {
        let head: String = self.text.chars().take(max_chars).collect();
        format!("{}...", head.replace('\n', " "))
    }

    /// Local creation date as YYYY-MM-DD
    pub fn created_date(&self) -> String {
        use chrono::{Local, TimeZone};
        match Local.timestamp_millis_opt(self.created_at) {
            chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d").to_string(),
            _ => "unknown".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vibe_from_str() {
        assert_eq!("culture".parse::<Vibe>().unwrap(), Vibe::Culture);
        assert_eq!("FOODIE".parse::<Vibe>().unwrap(), Vibe::Foodie);
        assert!("party".parse::<Vibe>().is_err());
    }

    #[test]
    fn test_budget_from_str_accepts_symbols() {
        assert_eq!("$$$".parse::<Budget>().unwrap(), Budget::Luxury);
        assert_eq!("moderate".parse::<Budget>().unwrap(), Budget::Moderate);
        assert!("cheap".parse::<Budget>().is_err());
    }

    #[test]
    fn test_vibe_cycle_wraps() {
        assert_eq!(Vibe::Relaxed.next(), Vibe::Adventure);
        assert_eq!(Vibe::Family.next(), Vibe::Relaxed);
        assert_eq!(Vibe::Relaxed.prev(), Vibe::Family);
    }

    #[test]
    fn test_budget_cycle_wraps() {
        assert_eq!(Budget::Luxury.next(), Budget::Budget);
        assert_eq!(Budget::Budget.prev(), Budget::Luxury);
    }

    #[test]
    fn test_defaults_match_form_defaults() {
        assert_eq!(Vibe::default(), Vibe::Relaxed);
        assert_eq!(Budget::default(), Budget::Moderate);
    }

    #[test]
    fn test_preferences_reject_blank_destination() {
        assert!(TripPreferences::new("", Vibe::Relaxed, Budget::Moderate).is_none());
        assert!(TripPreferences::new("   \t", Vibe::Relaxed, Budget::Moderate).is_none());

        let prefs = TripPreferences::new(" Kyoto ", Vibe::Culture, Budget::Moderate).unwrap();
        assert_eq!(prefs.destination, " Kyoto ");
    }

    #[test]
    fn test_itinerary_serializes_camel_case() {
        let prefs = TripPreferences::new("Kyoto", Vibe::Culture, Budget::Moderate).unwrap();
        let trip = GeneratedItinerary::new(prefs, "## Saturday".to_string(), None);

        let json = serde_json::to_value(&trip).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("groundingMetadata").is_none());
        assert_eq!(json["preferences"]["vibe"], "culture");
        assert_eq!(json["preferences"]["budget"], "moderate");
    }

    #[test]
    fn test_itinerary_ids_are_unique() {
        let prefs = TripPreferences::new("Taipei", Vibe::Foodie, Budget::Budget).unwrap();
        let a = GeneratedItinerary::new(prefs.clone(), "a".to_string(), None);
        let b = GeneratedItinerary::new(prefs, "b".to_string(), None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_preview_truncates_by_chars() {
        let prefs = TripPreferences::new("Napa Valley", Vibe::Relaxed, Budget::Luxury).unwrap();
        let trip = GeneratedItinerary::new(prefs, "é".repeat(80), None);
        assert_eq!(trip.preview(60), format!("{}...", "é".repeat(60)));
        assert_eq!(trip.title(), "Weekend in Napa Valley");
    }
}
