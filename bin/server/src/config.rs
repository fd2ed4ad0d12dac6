//! Centralized server configuration.
//!
//! Loaded via the `config` crate from environment variables. Keys are flat,
//! so `GEMINI_API_KEY` maps to `gemini_api_key`.

use promptflow_ai::GenerationConfig;
use promptflow_ai::backend::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use promptflow_core::Result;
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Errors from loading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `GEMINI_API_KEY` is unset or blank.
    MissingApiKey,
    /// A value could not be read or is out of range.
    Invalid { reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => {
                write!(f, "GEMINI_API_KEY environment variable is required")
            }
            Self::Invalid { reason } => write!(f, "invalid configuration: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Server configuration.
#[derive(Clone, Deserialize)]
pub struct ServerConfig {
    /// API key for the Google AI API.
    #[serde(default)]
    pub gemini_api_key: String,

    /// Model used by every flow.
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Base URL of the Google AI API.
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Bound on a single generation call, in seconds.
    #[serde(default = "default_generation_timeout_seconds")]
    pub generation_timeout_seconds: u64,

    /// Address the HTTP listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Whether to run the sample prompts and flows before serving.
    #[serde(default)]
    pub run_sample_flows: bool,
}

fn default_gemini_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_gemini_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_generation_timeout_seconds() -> u64 {
    60
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3400))
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` if the credential is absent, or `Invalid` if any
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(config::Environment::default())
    }

    fn load(environment: config::Environment) -> Result<Self, ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(environment.separator("__"))
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| ConfigError::Invalid {
                reason: e.to_string(),
            })?;

        if config.gemini_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey.into());
        }
        if config.generation_timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                reason: "generation_timeout_seconds must be positive".to_string(),
            }
            .into());
        }

        Ok(config)
    }

    /// Returns the generation backend configuration.
    #[must_use]
    pub fn generation(&self) -> GenerationConfig {
        GenerationConfig::google_ai(self.gemini_api_key.clone())
            .with_model(self.gemini_model.clone())
            .with_base_url(self.gemini_base_url.clone())
    }

    /// Returns the bound applied to each flow's generation call.
    #[must_use]
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_seconds)
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("gemini_api_key", &"<redacted>")
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("generation_timeout_seconds", &self.generation_timeout_seconds)
            .field("listen_addr", &self.listen_addr)
            .field("run_sample_flows", &self.run_sample_flows)
            .finish()
    }
}
