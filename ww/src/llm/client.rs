//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent
///
/// Implementations own the wire format and the credential check. A request
/// is single-shot: no retries, no streaming.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (suspends until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Model identifier, for logging
    fn model(&self) -> &str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::debug;

    use crate::llm::{FinishReason, TokenUsage};

    /// Scripted reply for the mock client
    #[derive(Debug, Clone)]
    pub enum MockReply {
        Response(CompletionResponse),
        ApiError { status: u16, message: String },
        MissingCredential,
    }

    /// Mock LLM client for unit tests
    pub struct MockLlmClient {
        replies: Mutex<VecDeque<MockReply>>,
        requests: Mutex<Vec<CompletionRequest>>,
        call_count: AtomicUsize,
    }

    impl MockLlmClient {
        pub fn new(replies: Vec<MockReply>) -> Self {
            debug!(reply_count = %replies.len(), "MockLlmClient::new: called");
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
                call_count: AtomicUsize::new(0),
            }
        }

        /// Mock that answers once with the given text
        pub fn with_text(text: impl Into<String>) -> Self {
            Self::new(vec![MockReply::Response(text_response(text))])
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Requests seen so far
        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    /// Plain text response with no grounding
    pub fn text_response(text: impl Into<String>) -> CompletionResponse {
        CompletionResponse {
            content: Some(text.into()),
            grounding_metadata: None,
            finish_reason: FinishReason::Stop,
            usage: TokenUsage::default(),
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            debug!("MockLlmClient::complete: called");
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);
            match self.replies.lock().unwrap().pop_front() {
                Some(MockReply::Response(response)) => Ok(response),
                Some(MockReply::ApiError { status, message }) => Err(LlmError::ApiError { status, message }),
                Some(MockReply::MissingCredential) => Err(LlmError::MissingCredential {
                    env_var: "GEMINI_API_KEY".to_string(),
                }),
                None => {
                    debug!("MockLlmClient::complete: no more mock replies");
                    Err(LlmError::InvalidResponse("No more mock responses".to_string()))
                }
            }
        }

        fn model(&self) -> &str {
            "mock"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn request() -> CompletionRequest {
            CompletionRequest {
                system_instruction: "Test".to_string(),
                prompt: "Hello".to_string(),
                temperature: 0.7,
                tools: vec![],
            }
        }

        #[tokio::test]
        async fn test_mock_client_returns_replies_in_order() {
            let client = MockLlmClient::new(vec![
                MockReply::Response(text_response("Response 1")),
                MockReply::ApiError {
                    status: 503,
                    message: "unavailable".to_string(),
                },
            ]);

            let first = client.complete(request()).await.unwrap();
            assert_eq!(first.content, Some("Response 1".to_string()));

            let second = client.complete(request()).await;
            assert!(matches!(second, Err(LlmError::ApiError { status: 503, .. })));

            assert_eq!(client.call_count(), 2);
            assert_eq!(client.requests().len(), 2);
        }

        #[tokio::test]
        async fn test_mock_client_errors_when_exhausted() {
            let client = MockLlmClient::new(vec![]);
            assert!(client.complete(request()).await.is_err());
        }
    }
}
