use promptflow_ai::{GenerationClient, GoogleAiClient};
use promptflow_flow::catalog;
use promptflow_server::{config::ServerConfig, routes::AppState, samples};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(report) => {
            tracing::error!(error = %report, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(model = %config.gemini_model, "Loaded configuration");

    let client: Arc<dyn GenerationClient> = match GoogleAiClient::new(config.generation()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "Failed to create generation client");
            return ExitCode::FAILURE;
        }
    };

    let timeout = config.generation_timeout();
    let registry = match catalog::default_registry(Arc::clone(&client), timeout) {
        Ok(registry) => registry,
        Err(report) => {
            tracing::error!(error = %report, "Failed to register flows");
            return ExitCode::FAILURE;
        }
    };

    if config.run_sample_flows {
        samples::run_direct_prompts(client.as_ref()).await;
        samples::run_sample_flows(&registry).await;
    }

    for flow in registry.list() {
        tracing::info!(
            route = %format!("POST http://{}/{}", config.listen_addr, flow.name),
            description = flow.description.as_deref().unwrap_or_default(),
            "Flow available"
        );
    }

    let state = AppState::new(registry, CancellationToken::new());
    if let Err(e) = promptflow_server::serve(config.listen_addr, state).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
