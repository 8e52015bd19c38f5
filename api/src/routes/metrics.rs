//! Prometheus scrape endpoint.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use shared::metrics::PROCESS_UPTIME_SECONDS;
use std::sync::Arc;

/// Content type of the Prometheus text exposition format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Creates the metrics routes.
pub fn metrics_routes(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(export_metrics))
        .with_state(state)
}

async fn export_metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state
        .metrics()
        .gauge(PROCESS_UPTIME_SECONDS, state.uptime().as_secs_f64(), &[]);

    // Rendering sorts every histogram buffer, keep it off the async workers.
    let metrics = Arc::clone(state.metrics());
    let body = tokio::task::spawn_blocking(move || metrics.render())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Metrics rendering aborted");
            ApiError::Metrics
        })?;

    Ok(([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body))
}
