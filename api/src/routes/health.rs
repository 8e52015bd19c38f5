//! Liveness and readiness endpoints.
//!
//! `GET /healthz` runs the liveness checks and `GET /readyz` the readiness
//! checks. Both answer 200 when every check is healthy and 503 otherwise,
//! with the aggregated report as the JSON body.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use shared::health::{CheckKind, HealthStatus};
use std::sync::Arc;

/// Creates the health check routes.
pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(liveness))
        .route("/readyz", get(readiness))
        .with_state(state)
}

async fn liveness(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<HealthStatus>), ApiError> {
    run_checks(&state, CheckKind::Liveness).await
}

async fn readiness(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<HealthStatus>), ApiError> {
    run_checks(&state, CheckKind::Readiness).await
}

/// Runs a category on its own task so a fault in the registry itself surfaces
/// as a 500 instead of tearing down the connection.
async fn run_checks(
    state: &AppState,
    kind: CheckKind,
) -> Result<(StatusCode, Json<HealthStatus>), ApiError> {
    let health = Arc::clone(state.health());
    let report = tokio::spawn(async move { health.check(kind).await })
        .await
        .map_err(|e| {
            tracing::error!(%kind, error = %e, "Health check run aborted");
            ApiError::HealthCheck
        })?;

    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    Ok((status, Json(report)))
}
