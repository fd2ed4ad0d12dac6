//! Error types for the AI crate.

use std::fmt;

/// Errors from generation backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Could not reach the provider.
    ProviderUnavailable { provider: String, reason: String },
    /// Request failed before a response arrived.
    RequestFailed { reason: String },
    /// Provider answered with a non-success status.
    Api { status: u16, message: String },
    /// Response parsing failed.
    ResponseParseFailed { reason: String },
    /// Provider returned no usable text.
    EmptyResponse { reason: String },
    /// Timeout waiting for response.
    Timeout,
    /// Rate limit exceeded.
    RateLimited { retry_after_secs: Option<u64> },
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderUnavailable { provider, reason } => {
                write!(f, "generation provider '{provider}' unavailable: {reason}")
            }
            Self::RequestFailed { reason } => {
                write!(f, "generation request failed: {reason}")
            }
            Self::Api { status, message } => {
                write!(f, "generation provider returned HTTP {status}: {message}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse generation response: {reason}")
            }
            Self::EmptyResponse { reason } => {
                write!(f, "generation returned no text: {reason}")
            }
            Self::Timeout => write!(f, "generation request timed out"),
            Self::RateLimited { retry_after_secs } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "rate limited, retry after {secs}s")
                } else {
                    write!(f, "rate limited")
                }
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid generation configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for GenerationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_unavailable_display() {
        let err = GenerationError::ProviderUnavailable {
            provider: "googleai".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("googleai"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn api_error_display() {
        let err = GenerationError::Api {
            status: 403,
            message: "API key not valid".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "generation provider returned HTTP 403: API key not valid"
        );
    }

    #[test]
    fn rate_limited_display() {
        let err = GenerationError::RateLimited {
            retry_after_secs: Some(30),
        };
        assert!(err.to_string().contains("30s"));
        let err = GenerationError::RateLimited {
            retry_after_secs: None,
        };
        assert_eq!(err.to_string(), "rate limited");
    }
}
