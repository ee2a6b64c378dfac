//! Prometheus metrics exposition endpoint.

use axum::{Router, routing::get};

use crate::{AppState, middleware::metrics};

/// GET `/metrics` - Prometheus text exposition.
async fn metrics_handler() -> String {
    metrics::render()
}

/// Creates the metrics route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics_handler))
}
