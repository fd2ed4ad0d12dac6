//! HTTP server exposing promptflow flows.
//!
//! Every registered flow is reachable at `POST /{flow_name}` with a JSON body
//! of the form `{"data": {...}}`.

pub mod config;
pub mod error;
pub mod routes;
pub mod samples;

use routes::AppState;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;

/// Binds `addr` and serves `state` until Ctrl-C.
///
/// On shutdown the state's token is cancelled first so in-flight flows stop
/// waiting on the backend, then open connections are drained.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let shutdown = state.shutdown.clone();
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down");
            shutdown.cancel();
        }
        () = shutdown.cancelled() => {}
    }
}
