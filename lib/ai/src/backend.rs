//! Generation backend abstraction.
//!
//! Flows only ever see [`GenerationClient`], so a deterministic stub can stand
//! in for the real provider in tests.

use crate::error::GenerationError;
use async_trait::async_trait;
use promptflow_core::GenerationId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "googleai/gemini-2.5-flash";

/// Google AI REST endpoint used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for a generation backend.
///
/// Built once at startup and handed to the client constructor.
#[derive(Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// Model identifier, optionally prefixed with the provider (`googleai/`).
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
}

impl GenerationConfig {
    /// Creates a Google AI configuration with the default model and endpoint.
    #[must_use]
    pub fn google_ai(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// A request to a generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The rendered prompt.
    pub prompt: String,
}

impl GenerateRequest {
    /// Creates a request for `prompt`.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// A response from a generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Identifies this generation in logs.
    pub id: GenerationId,
    /// The generated text.
    pub text: String,
    /// Model that generated the response.
    pub model: String,
    /// Token usage statistics.
    pub usage: TokenUsage,
}

impl GenerateResponse {
    /// Creates a response with zeroed usage.
    #[must_use]
    pub fn new(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: GenerationId::new(),
            text: text.into(),
            model: model.into(),
            usage: TokenUsage::default(),
        }
    }

    /// Sets the token usage.
    #[must_use]
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens.
    pub input_tokens: u32,
    /// Number of output tokens.
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Returns the total number of tokens.
    ///
    /// Saturates at `u32::MAX`; provider counts are not trusted.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Trait for generation backends.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generates text for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    async fn generate(&self, request: &GenerateRequest)
    -> Result<GenerateResponse, GenerationError>;

    /// Returns the model name.
    fn model(&self) -> &str;
}
