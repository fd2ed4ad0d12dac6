//! Google AI (Gemini) backend.
//!
//! Talks to the `v1beta/models/{model}:generateContent` REST endpoint.

use crate::backend::{
    GenerateRequest, GenerateResponse, GenerationClient, GenerationConfig, TokenUsage,
};
use crate::error::GenerationError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const PROVIDER: &str = "googleai";
const MODEL_PREFIX: &str = "googleai/";
const API_KEY_HEADER: &str = "x-goog-api-key";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Generation client for the Google AI API.
#[derive(Debug, Clone)]
pub struct GoogleAiClient {
    http: reqwest::Client,
    config: GenerationConfig,
    model_id: String,
}

impl GoogleAiClient {
    /// Creates a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot be built.
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationError::InvalidConfig {
                reason: "API key is empty".to_string(),
            });
        }

        let model_id = config
            .model
            .strip_prefix(MODEL_PREFIX)
            .unwrap_or(&config.model)
            .to_string();
        if model_id.is_empty() {
            return Err(GenerationError::InvalidConfig {
                reason: "model name is empty".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| GenerationError::InvalidConfig {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            config,
            model_id,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.model_id
        )
    }
}

#[async_trait]
impl GenerationClient for GoogleAiClient {
    #[instrument(skip(self, request), fields(model = %self.model_id))]
    async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, GenerationError> {
        let body = GenerateContentRequest::from(request);

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to reach Google AI");
                if e.is_timeout() {
                    GenerationError::Timeout
                } else if e.is_connect() {
                    GenerationError::ProviderUnavailable {
                        provider: PROVIDER.to_string(),
                        reason: e.to_string(),
                    }
                } else {
                    GenerationError::RequestFailed {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            return Err(GenerationError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            warn!(status = %status, message = %message, "Google AI returned error");
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| GenerationError::ResponseParseFailed {
                    reason: e.to_string(),
                })?;

        let result = parsed.into_generate_response(&self.model_id)?;
        debug!(
            generation_id = %result.id,
            total_tokens = result.usage.total(),
            "Generation completed"
        );
        Ok(result)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

impl From<&GenerateRequest> for GenerateContentRequest {
    fn from(request: &GenerateRequest) -> Self {
        Self {
            contents: vec![Content::user(&request.prompt)],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    fn into_generate_response(self, model_id: &str) -> Result<GenerateResponse, GenerationError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map_or_else(|| "no candidates".to_string(), |r| format!("prompt blocked: {r}"));
            return Err(GenerationError::EmptyResponse { reason });
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse {
                reason: candidate
                    .finish_reason
                    .unwrap_or_else(|| "empty content".to_string()),
            });
        }

        let usage = self
            .usage_metadata
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();
        let model = self.model_version.unwrap_or_else(|| model_id.to_string());

        Ok(GenerateResponse::new(text, model).with_usage(usage))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn client_for(server: &mockito::Server) -> GoogleAiClient {
        GoogleAiClient::new(GenerationConfig::google_ai("test-key").with_base_url(server.url()))
            .expect("client")
    }

    #[test]
    fn rejects_empty_api_key() {
        let err = GoogleAiClient::new(GenerationConfig::google_ai("  ")).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidConfig { .. }));
    }

    #[test]
    fn strips_provider_prefix_from_model() {
        let client = GoogleAiClient::new(
            GenerationConfig::google_ai("k").with_base_url("http://localhost:9999/"),
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(client.model(), "googleai/gemini-2.5-flash");
    }

    #[test]
    fn request_body_uses_wire_names() {
        let body =
            serde_json::to_value(GenerateContentRequest::from(&GenerateRequest::new("Hi"))).unwrap();
        assert_eq!(
            body,
            json!({"contents": [{"role": "user", "parts": [{"text": "Hi"}]}]})
        );
    }

    #[test]
    fn oversized_usage_counts_do_not_overflow() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "ok"}]}}],
            "usageMetadata": {"promptTokenCount": u32::MAX, "candidatesTokenCount": 1}
        }))
        .unwrap();

        let response = parsed.into_generate_response("gemini-2.5-flash").unwrap();

        assert_eq!(response.usage.input_tokens, u32::MAX);
        assert_eq!(response.usage.total(), u32::MAX);
        assert_eq!(response.model, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn generate_returns_candidate_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header(API_KEY_HEADER, "test-key")
            .match_body(Matcher::Json(json!({
                "contents": [{"role": "user", "parts": [{"text": "Say hello"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "there!"}]},
                        "finishReason": "STOP"
                    }],
                    "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 2},
                    "modelVersion": "gemini-2.5-flash-001"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let response = client_for(&server)
            .generate(&GenerateRequest::new("Say hello"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.text, "Hello there!");
        assert_eq!(response.model, "gemini-2.5-flash-001");
        assert_eq!(response.usage.total(), 5);
    }

    #[tokio::test]
    async fn generate_maps_api_error_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(400)
            .with_body(
                json!({"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}})
                    .to_string(),
            )
            .create_async()
            .await;

        let err = client_for(&server)
            .generate(&GenerateRequest::new("x"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GenerationError::Api {
                status: 400,
                message: "API key not valid".to_string()
            }
        );
    }

    #[tokio::test]
    async fn generate_maps_rate_limit() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(429)
            .with_header("retry-after", "17")
            .create_async()
            .await;

        let err = client_for(&server)
            .generate(&GenerateRequest::new("x"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GenerationError::RateLimited {
                retry_after_secs: Some(17)
            }
        );
    }

    #[tokio::test]
    async fn generate_reports_blocked_prompt() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(json!({"promptFeedback": {"blockReason": "SAFETY"}}).to_string())
            .create_async()
            .await;

        let err = client_for(&server)
            .generate(&GenerateRequest::new("x"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GenerationError::EmptyResponse {
                reason: "prompt blocked: SAFETY".to_string()
            }
        );
    }
}
