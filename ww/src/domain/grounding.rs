//! Grounding metadata returned with generated text
//!
//! Only the parts used for place cards are typed. Everything else the service
//! sends back is kept in `extra` so persisted trips round-trip unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Grounding metadata attached to a generation candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grounding_chunks: Vec<GroundingChunk>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GroundingMetadata {
    /// Place cards for every chunk that carries Maps data, in response order
    pub fn places(&self) -> Vec<PlaceCard> {
        debug!(chunk_count = self.grounding_chunks.len(), "GroundingMetadata::places: called");
        self.grounding_chunks
            .iter()
            .filter_map(|chunk| chunk.maps.as_ref())
            .map(PlaceCard::from_maps)
            .collect()
    }
}

/// One grounding source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps: Option<MapsChunk>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<WebChunk>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Google Maps place reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,

    /// Kept as sent: the service returns either a list or a single object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_answer_sources: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MapsChunk {
    /// Readable rating entries; malformed entries are skipped
    pub fn answer_sources(&self) -> Vec<PlaceAnswerSource> {
        let parse = |value: &Value| serde_json::from_value::<PlaceAnswerSource>(value.clone()).ok();
        match &self.place_answer_sources {
            Some(Value::Array(items)) => items.iter().filter_map(parse).collect(),
            Some(value @ Value::Object(_)) => parse(value).into_iter().collect(),
            _ => Vec::new(),
        }
    }
}

/// Rating data for a place
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceAnswerSource {
    #[serde(default)]
    pub place_rating: Option<f64>,

    #[serde(default)]
    pub user_review_count: Option<u64>,
}

/// Web search reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Shown in place of cards when a response cites no Maps locations
pub const NO_PLACES_TEXT: &str = "No specific map locations found in the response.";

/// Display summary of one Maps grounding chunk
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceCard {
    pub title: String,
    pub uri: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
    pub has_place_id: bool,
}

impl PlaceCard {
    fn from_maps(maps: &MapsChunk) -> Self {
        let source = maps.answer_sources().into_iter().next();
        Self {
            title: maps.title.clone().unwrap_or_else(|| "Unnamed place".to_string()),
            uri: maps.uri.clone(),
            rating: source.as_ref().and_then(|s| s.place_rating),
            review_count: source.as_ref().and_then(|s| s.user_review_count),
            has_place_id: maps.place_id.is_some(),
        }
    }

    /// Subtitle under the place title
    pub fn link_label(&self) -> &'static str {
        if self.has_place_id {
            "View on Google Maps"
        } else {
            "Location"
        }
    }

    /// e.g. "4.6 ★ (1200 reviews)"; None when there is no rating
    pub fn rating_line(&self) -> Option<String> {
        let rating = self.rating?;
        Some(match self.review_count {
            Some(count) => format!("{} ★ ({} reviews)", rating, count),
            None => format!("{} ★", rating),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_places_from_maps_chunks() {
        let metadata: GroundingMetadata = serde_json::from_value(json!({
            "groundingChunks": [
                {"maps": {"title": "Fushimi Inari", "uri": "https://maps.google.com/?cid=1",
                          "placeAnswerSources": [{"placeRating": 4.6, "userReviewCount": 1200}]}},
                {"web": {"title": "Some blog", "uri": "https://example.com"}}
            ]
        }))
        .unwrap();

        let places = metadata.places();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].title, "Fushimi Inari");
        assert_eq!(places[0].rating, Some(4.6));
        assert_eq!(places[0].review_count, Some(1200));
        assert_eq!(places[0].rating_line().as_deref(), Some("4.6 ★ (1200 reviews)"));
        assert_eq!(places[0].link_label(), "Location");
    }

    #[test]
    fn test_place_answer_sources_as_single_object() {
        let metadata: GroundingMetadata = serde_json::from_value(json!({
            "groundingChunks": [
                {"maps": {"title": "Nishiki Market", "placeId": "places/abc",
                          "placeAnswerSources": {"reviewSnippets": [{"review": "great"}]}}}
            ]
        }))
        .unwrap();

        let places = metadata.places();
        assert_eq!(places.len(), 1);
        assert!(places[0].rating_line().is_none());
        assert_eq!(places[0].link_label(), "View on Google Maps");
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let original = json!({
            "groundingChunks": [{"maps": {"title": "Kinkaku-ji"}}],
            "googleMapsWidgetContextToken": "token-123",
            "groundingSupports": [{"segment": {"startIndex": 0}}]
        });

        let metadata: GroundingMetadata = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(metadata.extra["googleMapsWidgetContextToken"], "token-123");

        let back = serde_json::to_value(&metadata).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_chunk_level_fields_survive_round_trip() {
        let original = json!({
            "groundingChunks": [
                {"maps": {
                    "title": "Fushimi Inari",
                    "text": "Shrine famous for its torii gates",
                    "placeAnswerSources": {"reviewSnippets": [{"review": "Go early"}]}
                }},
                {"retrievedContext": {"uri": "https://example.com/doc", "title": "doc"}},
                {"web": {"uri": "https://example.com", "title": "Blog", "domain": "example.com"}}
            ]
        });

        let metadata: GroundingMetadata = serde_json::from_value(original.clone()).unwrap();
        let maps = metadata.grounding_chunks[0].maps.as_ref().unwrap();
        assert_eq!(maps.extra["text"], "Shrine famous for its torii gates");
        assert!(metadata.grounding_chunks[1].extra.contains_key("retrievedContext"));

        // The single-object form stays an object
        let back = serde_json::to_value(&metadata).unwrap();
        assert!(back["groundingChunks"][0]["maps"]["placeAnswerSources"].is_object());
        assert_eq!(back, original);
    }

    #[test]
    fn test_malformed_answer_sources_are_skipped() {
        let maps: MapsChunk = serde_json::from_value(json!({
            "title": "Arashiyama",
            "placeAnswerSources": [{"placeRating": "high"}, {"placeRating": 4.2}]
        }))
        .unwrap();

        let sources = maps.answer_sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].place_rating, Some(4.2));
    }

    #[test]
    fn test_empty_metadata_has_no_places() {
        assert!(GroundingMetadata::default().places().is_empty());
    }
}
