//! LLM error types

use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key is missing. Set the {env_var} environment variable.")]
    MissingCredential { env_var: String },

    #[error("Unknown LLM provider: '{0}'. Supported: gemini")]
    UnknownProvider(String),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Check if this error is the missing-credential precondition
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, LlmError::MissingCredential { .. })
    }
}
