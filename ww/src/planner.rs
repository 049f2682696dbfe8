//! Itinerary request client
//!
//! Turns submitted preferences into one grounded `generateContent` call and
//! hands back the Markdown body plus any place data.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{GroundingMetadata, TripPreferences};
use crate::llm::{CompletionRequest, GroundingTool, LlmClient, LlmError};
use crate::prompts::PromptLoader;

/// Shown in place of an empty generation
pub const FALLBACK_TEXT: &str = "Sorry, I couldn't generate an itinerary at this time.";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Errors from an itinerary request
#[derive(Debug, Error)]
pub enum PlanError {
    /// No API key configured; raised before any network call
    #[error("{0}")]
    MissingCredential(#[source] LlmError),

    /// Transport or service failure, not retried
    #[error("Itinerary request failed: {0}")]
    RequestFailed(#[source] LlmError),

    #[error("Failed to build prompt: {0}")]
    Prompt(String),
}

impl From<LlmError> for PlanError {
    fn from(err: LlmError) -> Self {
        if err.is_missing_credential() {
            PlanError::MissingCredential(err)
        } else {
            PlanError::RequestFailed(err)
        }
    }
}

/// Result of a successful request
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    /// Markdown body, never empty
    pub text: String,
    pub grounding_metadata: Option<GroundingMetadata>,
}

/// Builds prompts and issues itinerary requests
#[derive(Clone)]
pub struct ItineraryPlanner {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    temperature: f32,
}

impl ItineraryPlanner {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>) -> Self {
        debug!(model = %llm.model(), "ItineraryPlanner::new: called");
        Self {
            llm,
            prompts,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// User turn sent with the system instruction
    pub fn user_prompt(prefs: &TripPreferences) -> String {
        format!("Plan a weekend trip to {}.", prefs.destination)
    }

    /// System instruction embedding destination, vibe and budget
    pub fn system_instruction(&self, prefs: &TripPreferences) -> Result<String, PlanError> {
        self.prompts
            .itinerary_prompt(prefs)
            .map_err(|e| PlanError::Prompt(e.to_string()))
    }

    /// Request an itinerary for the given preferences
    ///
    /// Exactly one request is made, with Maps grounding enabled. An empty
    /// generation is replaced by [`FALLBACK_TEXT`].
    pub async fn request_itinerary(&self, prefs: &TripPreferences) -> Result<Itinerary, PlanError> {
        debug!(destination = %prefs.destination, vibe = %prefs.vibe, budget = %prefs.budget, "request_itinerary: called");

        let request = CompletionRequest {
            system_instruction: self.system_instruction(prefs)?,
            prompt: Self::user_prompt(prefs),
            temperature: self.temperature,
            tools: vec![GroundingTool::GoogleMaps],
        };

        info!(model = %self.llm.model(), destination = %prefs.destination, "Requesting itinerary");
        let response = self.llm.complete(request).await.map_err(|e| {
            warn!(error = %e, "request_itinerary: request failed");
            PlanError::from(e)
        })?;

        let text = match response.content {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                warn!("request_itinerary: empty generation, using fallback text");
                FALLBACK_TEXT.to_string()
            }
        };

        Ok(Itinerary {
            text,
            grounding_metadata: response.grounding_metadata,
        })
    }
}
