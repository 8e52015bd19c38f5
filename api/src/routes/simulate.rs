//! Fault-injection endpoints for exercising probe failures.
//!
//! Both endpoints re-register the same check name, relying on the registry's
//! replace-on-register behavior to flip its outcome.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use shared::health::CheckKind;
use shared::logging::{context_from, LogLevel};

/// Name of the check toggled by the fault-injection endpoints.
pub const FAULT_CHECK: &str = "test-failure";

/// Request body for `POST /simulate-unhealthy`.
#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    /// Category to make unhealthy.
    #[serde(rename = "type")]
    pub kind: CheckKind,
}

/// Response for fault-injection requests.
#[derive(Debug, Serialize, Deserialize)]
pub struct SimulateResponse {
    /// What changed.
    pub message: String,
}

/// Creates the fault-injection routes.
pub fn simulate_routes(state: AppState) -> Router {
    Router::new()
        .route("/simulate-unhealthy", post(simulate_unhealthy))
        .route("/restore-healthy", post(restore_healthy))
        .with_state(state)
}

async fn simulate_unhealthy(
    State(state): State<AppState>,
    Json(request): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, ApiError> {
    state.register_static_check(request.kind, FAULT_CHECK, false);

    state.logger().log(
        LogLevel::Warn,
        "Simulating unhealthy state",
        &context_from([("type", request.kind.to_string())]),
    )?;

    Ok(Json(SimulateResponse {
        message: format!("{} checks will now report unhealthy", request.kind),
    }))
}

async fn restore_healthy(State(state): State<AppState>) -> Result<Json<SimulateResponse>, ApiError> {
    for kind in [CheckKind::Liveness, CheckKind::Readiness] {
        state.register_static_check(kind, FAULT_CHECK, true);
    }

    state.logger().info("Restored healthy state")?;

    Ok(Json(SimulateResponse {
        message: "All checks restored to healthy".to_string(),
    }))
}
