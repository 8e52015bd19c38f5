//! Integration tests for liveness and readiness endpoints.
//!
//! Tests cover:
//! - Default checks
//! - Aggregation and status codes
//! - Timeouts of slow probes

use axum::http::StatusCode;
use shared::health::{CheckKind, HealthCheck};
use std::time::{Duration, Instant};

use super::common::{get, test_app};

#[tokio::test]
async fn test_default_checks_are_healthy() {
    let (app, _state, _sink) = test_app();

    let (status, response) = get(app.clone(), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["checks"]["process"]["status"], "healthy");

    let (status, response) = get(app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["checks"]["server"]["status"], "healthy");
}

#[tokio::test]
async fn test_failing_check_returns_503() {
    let (app, state, _sink) = test_app();
    state.health().register_liveness("app", || async { Ok(true) });
    state.health().register_liveness("flaky", || async { Ok(false) });

    let (status, response) = get(app, "/healthz").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response["status"], "unhealthy");
    assert_eq!(response["checks"]["app"]["status"], "healthy");
    assert_eq!(response["checks"]["flaky"]["status"], "unhealthy");
}

#[tokio::test]
async fn test_slow_probe_reports_timeout() {
    let (app, state, _sink) = test_app();
    state.health().register(
        CheckKind::Readiness,
        HealthCheck::new("database", || async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(true)
        })
        .with_timeout(Duration::from_millis(100)),
    );

    let started = Instant::now();
    let (status, response) = get(app, "/readyz").await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let database = &response["checks"]["database"];
    assert_eq!(database["status"], "unhealthy");
    assert_eq!(database["message"], "Check timeout");
    let duration = database["durationMs"].as_u64().unwrap();
    assert!((100..1000).contains(&duration));
}

#[tokio::test]
async fn test_probe_error_message_in_report() {
    let (app, state, _sink) = test_app();
    state
        .health()
        .register_readiness("cache", || async { Err(anyhow::anyhow!("cache unreachable")) });

    let (status, response) = get(app, "/readyz").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response["checks"]["cache"]["message"], "cache unreachable");
    assert_eq!(response["checks"]["server"]["status"], "healthy");
}
