//! Deterministic generation clients.
//!
//! These never leave the process and are meant for tests and local wiring.

use crate::backend::{GenerateRequest, GenerateResponse, GenerationClient};
use crate::error::GenerationError;
use async_trait::async_trait;
use std::time::Duration;

/// A mock client that can be configured to succeed or fail.
#[derive(Debug, Clone)]
pub struct MockClient {
    /// If set, all calls fail with this error.
    pub fail_with: Option<GenerationError>,
    /// The text returned on success.
    pub text: String,
    /// Delay before answering.
    pub delay: Option<Duration>,
}

impl MockClient {
    /// Creates a mock client that always returns `text`.
    #[must_use]
    pub fn succeeding(text: impl Into<String>) -> Self {
        Self {
            fail_with: None,
            text: text.into(),
            delay: None,
        }
    }

    /// Creates a mock client that always fails with `error`.
    #[must_use]
    pub fn failing(error: GenerationError) -> Self {
        Self {
            fail_with: Some(error),
            text: String::new(),
            delay: None,
        }
    }

    /// Makes every call wait for `delay` before answering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl GenerationClient for MockClient {
    async fn generate(
        &self,
        _request: &GenerateRequest,
    ) -> Result<GenerateResponse, GenerationError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(GenerateResponse::new(self.text.clone(), self.model())),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}

/// A client that answers with the prompt it was given.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoClient;

#[async_trait]
impl GenerationClient for EchoClient {
    async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, GenerationError> {
        // Yield so concurrent callers interleave.
        tokio::task::yield_now().await;
        Ok(GenerateResponse::new(request.prompt.clone(), self.model()))
    }

    fn model(&self) -> &str {
        "echo"
    }
}
