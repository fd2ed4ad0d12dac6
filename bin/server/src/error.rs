//! HTTP error responses.
//!
//! Domain errors are logged with full detail here and turned into a
//! user-safe JSON body: `{"error": {"status": "...", "message": "..."}}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use promptflow_flow::{FlowError, RegistryError};
use rootcause::prelude::Report;
use serde_json::json;

/// An error returned to an HTTP caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error with the given status, status code name and message.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// A 400 response.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", message)
    }

    /// A 404 response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// A 500 response.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", message)
    }

    /// Returns the HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Report<FlowError>> for ApiError {
    fn from(report: Report<FlowError>) -> Self {
        match report.current_context() {
            FlowError::InvalidInput { .. } => {
                tracing::debug!(error = %report, "Rejected flow input");
                Self::bad_request(report.current_context().to_string())
            }
            FlowError::Generation { flow, .. } => {
                tracing::error!(error = %report, flow = %flow, "Flow generation failed");
                Self::internal(format!("flow '{flow}' failed to generate a response"))
            }
            FlowError::Timeout { flow, .. } => {
                tracing::error!(error = %report, flow = %flow, "Flow timed out");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DEADLINE_EXCEEDED",
                    format!("flow '{flow}' timed out"),
                )
            }
            FlowError::Cancelled { flow } => {
                tracing::warn!(flow = %flow, "Flow cancelled");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "UNAVAILABLE",
                    "server is shutting down",
                )
            }
            FlowError::OutputEncoding { flow, .. } => {
                tracing::error!(error = %report, flow = %flow, "Flow output encoding failed");
                Self::internal(format!("flow '{flow}' produced unencodable output"))
            }
        }
    }
}

impl From<Report<RegistryError>> for ApiError {
    fn from(report: Report<RegistryError>) -> Self {
        match report.current_context() {
            RegistryError::NotFound { name } => {
                tracing::debug!(flow = %name, "Unknown flow requested");
                Self::not_found(format!("flow not found: {name}"))
            }
            RegistryError::DuplicateName { .. } => {
                tracing::error!(error = %report, "Unexpected registry error");
                Self::internal("internal error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "status": self.code,
                "message": self.message,
            }
        });
        (self.status, Json(body)).into_response()
    }
}
