//! LLM request/response types
//!
//! These model a single `generateContent` call: one system instruction, one
//! user prompt, optional grounding tools.

use serde_json::json;
use tracing::debug;

use crate::domain::GroundingMetadata;

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction (rendered from the Handlebars template)
    pub system_instruction: String,

    /// Single user turn
    pub prompt: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Grounding tools to enable
    pub tools: Vec<GroundingTool>,
}

/// Server-side grounding tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundingTool {
    /// Google Maps place grounding
    GoogleMaps,
}

impl GroundingTool {
    /// Tool entry for the Gemini `tools` array
    pub fn to_gemini_schema(&self) -> serde_json::Value {
        debug!(?self, "GroundingTool::to_gemini_schema: called");
        match self {
            Self::GoogleMaps => json!({ "googleMaps": {} }),
        }
    }
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Text content (if any)
    pub content: Option<String>,

    /// Grounding metadata of the first candidate
    pub grounding_metadata: Option<GroundingMetadata>,

    /// Why the model stopped
    pub finish_reason: FinishReason,

    /// Token usage
    pub usage: TokenUsage,
}

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Other(String),
}

impl FinishReason {
    /// Parse from Gemini `finishReason` string
    pub fn from_gemini(s: &str) -> Self {
        debug!(%s, "FinishReason::from_gemini: called");
        match s {
            "STOP" => FinishReason::Stop,
            "MAX_TOKENS" => FinishReason::MaxTokens,
            "SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" => FinishReason::Safety,
            other => {
                debug!(%other, "FinishReason::from_gemini: unrecognized reason");
                FinishReason::Other(other.to_string())
            }
        }
    }
}

/// Token usage for a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_tool_schema() {
        assert_eq!(GroundingTool::GoogleMaps.to_gemini_schema(), json!({"googleMaps": {}}));
    }

    #[test]
    fn test_finish_reason_from_gemini() {
        assert_eq!(FinishReason::from_gemini("STOP"), FinishReason::Stop);
        assert_eq!(FinishReason::from_gemini("MAX_TOKENS"), FinishReason::MaxTokens);
        assert_eq!(FinishReason::from_gemini("SAFETY"), FinishReason::Safety);
        assert_eq!(
            FinishReason::from_gemini("RECITATION"),
            FinishReason::Other("RECITATION".to_string())
        );
    }
}
