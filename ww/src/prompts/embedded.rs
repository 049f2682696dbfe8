//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Weekend itinerary system instruction
pub const ITINERARY: &str = include_str!("../../prompts/itinerary.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "itinerary" => {
            debug!("get_embedded: matched itinerary");
            Some(ITINERARY)
        }
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_itinerary() {
        let itinerary = get_embedded("itinerary").unwrap();
        assert!(itinerary.contains("expert travel guide"));
        assert!(itinerary.contains("## Saturday"));
        assert!(itinerary.contains("## Sunday"));
        assert!(itinerary.contains("Morning, Afternoon, and Evening"));
        assert!(itinerary.contains("Do NOT output JSON"));
        assert!(itinerary.contains("{{destination}}"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }
}
