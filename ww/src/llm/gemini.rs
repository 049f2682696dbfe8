//! Gemini API client implementation
//!
//! Implements the LlmClient trait for the `generateContent` endpoint. One
//! request per call; failures are reported, never retried.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{CompletionRequest, CompletionResponse, FinishReason, LlmClient, LlmError, TokenUsage};
use crate::config::LlmConfig;
use crate::domain::GroundingMetadata;

/// Gemini API client
pub struct GeminiClient {
    model: String,
    /// None when the configured environment variable is unset or empty
    api_key: Option<String>,
    api_key_env: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// A missing API key is not an error here; it surfaces on the first
    /// request so the interface can start without one.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, base_url = %config.base_url, "GeminiClient::from_config: called");
        let api_key = config.api_key();
        if api_key.is_none() {
            warn!(env_var = %config.api_key_env, "GeminiClient::from_config: no API key configured");
        }

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            max_tokens: config.max_tokens,
        })
    }

    /// Full URL of the generateContent endpoint
    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the request body for the Gemini API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, tool_count = request.tools.len(), "build_request_body: called");

        let mut body = serde_json::json!({
            "systemInstruction": {
                "parts": [{ "text": request.system_instruction }],
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": self.max_tokens,
            },
        });

        if !request.tools.is_empty() {
            debug!("build_request_body: tools not empty, adding tools");
            body["tools"] = serde_json::json!(
                request
                    .tools
                    .iter()
                    .map(|t| t.to_gemini_schema())
                    .collect::<Vec<_>>()
            );
        } else {
            debug!("build_request_body: no tools");
        }

        body
    }

    /// Parse the Gemini API response
    fn parse_response(&self, api_response: GeminiResponse) -> CompletionResponse {
        debug!(candidate_count = api_response.candidates.len(), "parse_response: called");
        let candidate = api_response.candidates.into_iter().next();

        let (content, grounding_metadata, finish_reason) = match candidate {
            Some(c) => {
                let text: String = c
                    .content
                    .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
                    .unwrap_or_default();
                let content = if text.is_empty() { None } else { Some(text) };

                // Grounding data is optional; a shape we cannot read is dropped, not fatal
                let grounding_metadata = c.grounding_metadata.and_then(|value| {
                    match serde_json::from_value::<GroundingMetadata>(value) {
                        Ok(metadata) => Some(metadata),
                        Err(e) => {
                            warn!(error = %e, "parse_response: unreadable grounding metadata, ignoring");
                            None
                        }
                    }
                });

                let finish_reason = c
                    .finish_reason
                    .as_deref()
                    .map(FinishReason::from_gemini)
                    .unwrap_or(FinishReason::Stop);
                (content, grounding_metadata, finish_reason)
            }
            None => {
                debug!("parse_response: no candidates");
                (None, None, FinishReason::Stop)
            }
        };

        let usage = api_response
            .usage_metadata
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        CompletionResponse {
            content,
            grounding_metadata,
            finish_reason,
            usage,
        }
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, "complete: called");
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            debug!("complete: no API key, refusing before network call");
            LlmError::MissingCredential {
                env_var: self.api_key_env.clone(),
            }
        })?;

        let body = self.build_request_body(&request);
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(LlmError::Network)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            debug!(%status, "complete: API error");
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, message: text });
        }

        let api_response: GeminiResponse = response.json().await?;
        let parsed = self.parse_response(api_response);
        info!(
            "Gemini response: finish_reason={:?}, has_content={}, places={}, tokens={}in/{}out",
            parsed.finish_reason,
            parsed.content.is_some(),
            parsed
                .grounding_metadata
                .as_ref()
                .map(|m| m.places().len())
                .unwrap_or(0),
            parsed.usage.input_tokens,
            parsed.usage.output_tokens
        );
        Ok(parsed)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
    grounding_metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GroundingTool;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    fn client(api_key: Option<&str>) -> GeminiClient {
        // Unroutable; any test that reaches the network would fail
        client_at("http://127.0.0.1:9", api_key)
    }

    fn client_at(base_url: &str, api_key: Option<&str>) -> GeminiClient {
        GeminiClient {
            model: "gemini-2.5-flash".to_string(),
            api_key: api_key.map(str::to_string),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: base_url.to_string(),
            http: Client::new(),
            max_tokens: 8192,
        }
    }

    /// Answer one HTTP request with a canned response
    ///
    /// Returns the base URL to point a client at and a receiver for the raw
    /// request text.
    async fn serve_once(status_line: &'static str, body: &str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
        });

        (base_url, rx)
    }

    /// Headers received and the body matches content-length
    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            system_instruction: "You are an expert travel guide.".to_string(),
            prompt: "Plan a weekend trip to Kyoto.".to_string(),
            temperature: 0.7,
            tools: vec![GroundingTool::GoogleMaps],
        }
    }

    #[test]
    fn test_build_request_body() {
        let body = client(Some("key")).build_request_body(&request());

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are an expert travel guide.");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Plan a weekend trip to Kyoto.");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(body["tools"], json!([{"googleMaps": {}}]));
    }

    #[test]
    fn test_build_request_body_without_tools() {
        let mut req = request();
        req.tools.clear();
        let body = client(Some("key")).build_request_body(&req);
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            client(None).endpoint(),
            "http://127.0.0.1:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_parse_response_with_grounding() {
        let api: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "## Saturday\n"}, {"text": "Morning: temples"}]},
                "finishReason": "STOP",
                "groundingMetadata": {
                    "groundingChunks": [{"maps": {"title": "Fushimi Inari", "uri": "https://maps.google.com/?cid=1",
                        "placeAnswerSources": [{"placeRating": 4.6, "userReviewCount": 1200}]}}]
                }
            }],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 800}
        }))
        .unwrap();

        let response = client(Some("key")).parse_response(api);
        assert_eq!(response.content.as_deref(), Some("## Saturday\nMorning: temples"));
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage.input_tokens, 120);
        assert_eq!(response.usage.output_tokens, 800);

        let places = response.grounding_metadata.unwrap().places();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].title, "Fushimi Inari");
    }

    #[test]
    fn test_parse_response_without_candidates() {
        let api: GeminiResponse = serde_json::from_value(json!({})).unwrap();
        let response = client(Some("key")).parse_response(api);
        assert!(response.content.is_none());
        assert!(response.grounding_metadata.is_none());
    }

    #[test]
    fn test_parse_response_drops_unreadable_grounding() {
        let api: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"parts": [{"text": "hello"}]},
                "groundingMetadata": {"groundingChunks": "not-a-list"}
            }]
        }))
        .unwrap();

        let response = client(Some("key")).parse_response(api);
        assert_eq!(response.content.as_deref(), Some("hello"));
        assert!(response.grounding_metadata.is_none());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let result = client(None).complete(request()).await;
        match result {
            Err(LlmError::MissingCredential { env_var }) => assert_eq!(env_var, "GEMINI_API_KEY"),
            other => panic!("expected MissingCredential, got {:?}", other.map(|r| r.content)),
        }
    }

    #[tokio::test]
    async fn test_complete_over_http() {
        let body = json!({
            "candidates": [{
                "content": {"parts": [{"text": "## Saturday\nFushimi Inari at dawn"}]},
                "finishReason": "STOP",
                "groundingMetadata": {"groundingChunks": [{"maps": {
                    "title": "Fushimi Inari",
                    "placeAnswerSources": [{"placeRating": 4.6, "userReviewCount": 1200}]
                }}]}
            }],
            "usageMetadata": {"promptTokenCount": 50, "candidatesTokenCount": 400}
        })
        .to_string();
        let (base_url, request_rx) = serve_once("200 OK", &body).await;

        let response = client_at(&base_url, Some("test-key")).complete(request()).await.unwrap();
        assert_eq!(response.content.as_deref(), Some("## Saturday\nFushimi Inari at dawn"));
        assert_eq!(response.usage.output_tokens, 400);
        let places = response.grounding_metadata.unwrap().places();
        assert_eq!(places[0].rating_line().as_deref(), Some("4.6 ★ (1200 reviews)"));

        let raw = request_rx.await.unwrap();
        assert!(raw.starts_with("POST /v1beta/models/gemini-2.5-flash:generateContent "));
        assert!(raw.to_lowercase().contains("x-goog-api-key: test-key"));
        assert!(raw.contains("\"googleMaps\""));
    }

    #[tokio::test]
    async fn test_complete_server_error_carries_body() {
        let (base_url, _rx) = serve_once("500 Internal Server Error", r#"{"error":{"message":"backend down"}}"#).await;

        let result = client_at(&base_url, Some("test-key")).complete(request()).await;
        match result {
            Err(LlmError::ApiError { status, message }) => {
                assert_eq!(status, 500);
                assert!(message.contains("backend down"));
            }
            other => panic!("expected ApiError, got {:?}", other.map(|r| r.content)),
        }
    }

    #[tokio::test]
    async fn test_complete_rate_limit_is_api_error() {
        let (base_url, _rx) = serve_once("429 Too Many Requests", r#"{"error":{"message":"quota"}}"#).await;

        let result = client_at(&base_url, Some("test-key")).complete(request()).await;
        assert!(matches!(result, Err(LlmError::ApiError { status: 429, .. })));
    }

    #[tokio::test]
    async fn test_complete_undecodable_body() {
        let (base_url, _rx) = serve_once("200 OK", "this is not json").await;

        let result = client_at(&base_url, Some("test-key")).complete(request()).await;
        assert!(matches!(result, Err(LlmError::Network(_))));
    }
}
