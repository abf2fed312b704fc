//! Server startup and graceful shutdown

use anyhow::Result;
use axum::Router;
use resizer_core::{Config, LogEvent};
use std::sync::Arc;

use crate::state::AppState;

/// Serve until SIGINT/SIGTERM, then drain the persist queue.
pub async fn start_server(config: &Config, app: Router, state: Arc<AppState>) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        event = %LogEvent::ServerStart,
        addr = %addr,
        environment = %config.environment(),
        metadata_backend = ?config.metadata_backend(),
        storage_backend = %config.storage_backend(),
        max_http_connections = config.max_http_connections(),
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(queued = state.persist.queued(), "Draining persist queue");
    if state.persist.shutdown().await {
        tracing::info!("Persist queue drained");
    } else {
        tracing::warn!("Persist queue shutdown incomplete, some objects were not stored");
    }

    Ok(())
}

/// Signal handler for graceful shutdown
///
/// # Panics
/// Panics if the Ctrl+C or (on Unix) SIGTERM handler cannot be installed.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
