//! HTTP adapter: `POST /{flow_name}` runs the named flow.
//!
//! Request bodies carry the flow input under `data`; responses are the flow
//! output serialized as JSON.

use crate::error::ApiError;
use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::post;
use promptflow_flow::FlowRegistry;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Shared state for request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Every servable flow. Never mutated after startup.
    pub registry: Arc<FlowRegistry>,
    /// Cancelled when the server starts shutting down.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Creates the state.
    #[must_use]
    pub fn new(registry: FlowRegistry, shutdown: CancellationToken) -> Self {
        Self {
            registry: Arc::new(registry),
            shutdown,
        }
    }
}

/// Body of a flow request.
#[derive(Debug, Deserialize)]
struct FlowRequest {
    data: JsonValue,
}

/// Builds the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/{flow_name}", post(run_flow))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn run_flow(
    State(state): State<AppState>,
    Path(flow_name): Path<String>,
    body: Bytes,
) -> Result<Json<JsonValue>, ApiError> {
    let flow = state.registry.get(&flow_name)?;

    let request: FlowRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))?;

    let output = flow
        .run_json(request.data, state.shutdown.child_token())
        .await?;

    Ok(Json(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use promptflow_ai::{GenerationClient, GenerationError, MockClient};
    use promptflow_flow::catalog::default_registry;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app_with(client: impl GenerationClient + 'static) -> (Router, CancellationToken) {
        let registry = default_registry(Arc::new(client), Duration::from_secs(5)).unwrap();
        let shutdown = CancellationToken::new();
        (router(AppState::new(registry, shutdown.clone())), shutdown)
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, JsonValue) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn greeting_returns_generated_text() {
        let (app, _) = app_with(MockClient::succeeding("Hello Alice!"));

        let (status, body) = post_json(
            app,
            "/greeting",
            r#"{"data":{"name":"Alice","language":"english"}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"greeting": "Hello Alice!"}));
    }

    #[tokio::test]
    async fn joke_route_uses_flow_name() {
        let (app, _) = app_with(MockClient::succeeding("A short joke."));

        let (status, body) =
            post_json(app, "/jokeGenerator", r#"{"data":{"topic":"programming"}}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["joke"], "A short joke.");
    }

    #[tokio::test]
    async fn unknown_flow_is_not_found() {
        let (app, _) = app_with(MockClient::succeeding("unused"));

        let (status, body) = post_json(app, "/poem", r#"{"data":{}}"#).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["status"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn undefined_route_is_not_found() {
        let (app, _) = app_with(MockClient::succeeding("unused"));

        let (status, _) = post_json(app, "/greeting/extra", r#"{"data":{}}"#).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (app, _) = app_with(MockClient::succeeding("unused"));

        let (status, body) = post_json(app, "/greeting", "{not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["status"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn missing_data_is_bad_request() {
        let (app, _) = app_with(MockClient::succeeding("unused"));

        let (status, _) = post_json(app, "/greeting", r#"{"name":"Alice"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blank_input_is_bad_request() {
        let (app, _) = app_with(MockClient::succeeding("unused"));

        let (status, body) = post_json(
            app,
            "/greeting",
            r#"{"data":{"name":"","language":"english"}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("name"));
    }

    #[tokio::test]
    async fn generation_failure_is_internal_error() {
        let (app, _) = app_with(MockClient::failing(GenerationError::RequestFailed {
            reason: "connection reset".to_string(),
        }));

        let (status, body) =
            post_json(app, "/jokeGenerator", r#"{"data":{"topic":"cats"}}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["status"], "INTERNAL");
    }

    #[tokio::test]
    async fn shutdown_cancels_flows() {
        let client = MockClient::succeeding("late").with_delay(Duration::from_secs(30));
        let (app, shutdown) = app_with(client);
        shutdown.cancel();

        let (status, body) =
            post_json(app, "/jokeGenerator", r#"{"data":{"topic":"cats"}}"#).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["status"], "UNAVAILABLE");
    }
}
