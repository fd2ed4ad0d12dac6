//! Error types for the flow crate.
//!
//! Errors are returned through `promptflow_core::Result`, so callers receive a
//! `rootcause::Report` and classify it with `current_context()`:
//! - `ValidationError`: a single input field failed validation
//! - `FlowError`: a flow run failed
//! - `RegistryError`: registration or lookup failed

use promptflow_ai::GenerationError;
use std::fmt;
use std::time::Duration;

/// A rejected input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The offending field.
    pub field: &'static str,
    /// Why it was rejected.
    pub reason: String,
}

impl ValidationError {
    /// Creates a validation error for `field`.
    #[must_use]
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    /// Fails when `value` is empty or whitespace.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming `field`.
    pub fn require_non_blank(field: &'static str, value: &str) -> Result<(), Self> {
        if value.trim().is_empty() {
            Err(Self::new(field, "must not be empty"))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}' {}", self.field, self.reason)
    }
}

impl std::error::Error for ValidationError {}

/// Errors from running a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// Input was malformed or failed validation.
    InvalidInput { flow: String, reason: String },
    /// The generation backend failed.
    Generation {
        flow: String,
        source: GenerationError,
    },
    /// The generation call did not finish in time.
    Timeout { flow: String, after: Duration },
    /// The caller cancelled the run.
    Cancelled { flow: String },
    /// Output could not be encoded as JSON.
    OutputEncoding { flow: String, reason: String },
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { flow, reason } => {
                write!(f, "invalid input for flow '{flow}': {reason}")
            }
            Self::Generation { flow, source } => {
                write!(f, "flow '{flow}' failed to generate: {source}")
            }
            Self::Timeout { flow, after } => {
                write!(f, "flow '{flow}' timed out after {}s", after.as_secs_f64())
            }
            Self::Cancelled { flow } => write!(f, "flow '{flow}' was cancelled"),
            Self::OutputEncoding { flow, reason } => {
                write!(f, "failed to encode output of flow '{flow}': {reason}")
            }
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Generation { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors from registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A flow with this name is already registered.
    DuplicateName { name: String },
    /// No flow with this name is registered.
    NotFound { name: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName { name } => {
                write!(f, "flow '{name}' is already registered")
            }
            Self::NotFound { name } => write!(f, "flow not found: {name}"),
        }
    }
}

impl std::error::Error for RegistryError {}
