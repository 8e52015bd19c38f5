//! Integration tests for the metrics endpoint.
//!
//! Tests cover:
//! - Content type and headers
//! - Request observation feeding the exporter
//! - Deterministic rendering

use axum::http::StatusCode;
use shared::metrics::{HTTP_ERRORS_TOTAL, HTTP_REQUESTS_TOTAL};

use super::common::{get, get_text, test_app};

#[tokio::test]
async fn test_metrics_endpoint_lists_families() {
    let (app, _state, _sink) = test_app();

    let (status, body) = get_text(app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("# TYPE http_requests_total counter"));
    assert!(body.contains("# TYPE http_errors_total counter"));
    assert!(body.contains("# TYPE http_request_duration_seconds histogram"));
    assert!(body.contains("# TYPE process_uptime_seconds gauge"));
}

#[tokio::test]
async fn test_served_requests_show_up_in_metrics() {
    let (app, state, _sink) = test_app();

    get(app.clone(), "/healthz").await;
    get(app.clone(), "/healthz").await;
    get(app.clone(), "/nope").await;

    let ok = [("method", "GET"), ("path", "/healthz"), ("status", "200")];
    let missing = [("method", "GET"), ("path", "/nope"), ("status", "404")];
    assert_eq!(state.metrics().counter_value(HTTP_REQUESTS_TOTAL, &ok), Some(2.0));
    assert_eq!(state.metrics().counter_value(HTTP_ERRORS_TOTAL, &ok), None);
    assert_eq!(state.metrics().counter_value(HTTP_ERRORS_TOTAL, &missing), Some(1.0));

    let (_, body) = get_text(app, "/metrics").await;
    assert!(body.contains(r#"http_requests_total{method="GET",path="/healthz",status="200"} 2"#));
    assert!(body.contains(r#"http_errors_total{method="GET",path="/nope",status="404"} 1"#));
    assert!(body.contains(r#"http_request_duration_seconds_count{method="GET",path="/healthz"} 2"#));
}

#[tokio::test]
async fn test_render_stable_without_writes() {
    let (_app, state, _sink) = test_app();
    state.metrics().observe_http("GET", "/x", 404, 120.0);
    state.metrics().gauge("queue_depth", 3.0, &[("queue", "mail")]);

    assert_eq!(state.metrics().render(), state.metrics().render());
}

#[tokio::test]
async fn test_reset_clears_exported_series() {
    let (app, state, _sink) = test_app();
    state.metrics().counter("jobs_total", 4.0, &[]);

    state.metrics().reset();

    let (_, body) = get_text(app, "/metrics").await;
    assert!(!body.contains("jobs_total"));
}
