//! Integration tests for fault injection.
//!
//! Tests cover:
//! - Forcing a category unhealthy and restoring it
//! - Structured log output for fault-injection events

use axum::http::StatusCode;
use serde_json::json;

use super::common::{get, post_json, test_app};

#[tokio::test]
async fn test_simulate_liveness_failure_and_recover() {
    let (app, _state, _sink) = test_app();

    let (status, response) =
        post_json(app.clone(), "/simulate-unhealthy", json!({"type": "liveness"})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(response["message"].as_str().unwrap().contains("liveness"));

    let (status, response) = get(app.clone(), "/healthz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response["checks"]["test-failure"]["status"], "unhealthy");
    assert_eq!(response["checks"]["process"]["status"], "healthy");

    // Readiness is untouched
    let (status, _) = get(app.clone(), "/readyz").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(app.clone(), "/restore-healthy", json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, response) = get(app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["checks"]["test-failure"]["status"], "healthy");
}

#[tokio::test]
async fn test_simulate_requires_known_type() {
    let (app, state, _sink) = test_app();

    let (status, _) = post_json(app, "/simulate-unhealthy", json!({"type": "everything"})).await;

    assert!(status.is_client_error());
    assert!(state.health().check_readiness().await.is_healthy());
}

#[tokio::test]
async fn test_fault_injection_is_logged() {
    let (app, _state, sink) = test_app();

    post_json(app, "/simulate-unhealthy", json!({"type": "readiness"})).await;

    let warning = sink
        .records()
        .into_iter()
        .find(|r| r["message"] == "Simulating unhealthy state")
        .unwrap();
    assert_eq!(warning["level"], "warn");
    assert_eq!(warning["service"], "vitals-test");
    assert_eq!(warning["context"]["type"], "readiness");
}
