//! Route configuration and setup

use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};
use resizer_core::Config;
use std::sync::Arc;
use std::time::Duration;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the router: resize on `/` and `/resize`, liveness on `/health`.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/", get(handlers::resize::resize))
        .route("/resize", get(handlers::resize::resize))
        .route("/health", get(handlers::health::health))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_seconds(),
        )));

    let max_connections = config.max_http_connections();
    if max_connections > 0 {
        tracing::info!(max_connections, "HTTP concurrency limit enabled");
        // One semaphore shared by every route.
        app = app.layer(GlobalConcurrencyLimitLayer::new(max_connections));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
