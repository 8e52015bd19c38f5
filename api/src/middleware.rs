//! Request observation middleware.
//!
//! Times every request, feeds the result into the metrics registry and writes
//! one structured log record per request under a per-request trace id.

use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use serde_json::json;
use shared::logging::{context_from, LogLevel};
use std::time::Instant;

/// Header carrying the request's trace id in both directions.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Path excluded from request metrics so scrapes do not count themselves.
const SCRAPE_PATH: &str = "/metrics";

/// Records request count, duration and errors, and logs request completion.
///
/// An incoming `x-trace-id` header is reused; otherwise a fresh id is
/// generated. The id is echoed back on the response.
pub async fn observe_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let mut logger = state.logger().with_context(context_from([
        ("method", method.clone()),
        ("path", path.clone()),
    ]));
    let incoming = request
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    let trace_id = match incoming {
        Some(id) => {
            logger.set_trace_id(id.clone());
            id
        }
        None => logger.generate_trace_id(),
    };

    let started = Instant::now();
    let mut response = next.run(request).await;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    let status = response.status().as_u16();

    if path != SCRAPE_PATH {
        state
            .metrics()
            .observe_http(&method, &path, status, elapsed_ms);
    }

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }

    let level = match status {
        500.. => LogLevel::Error,
        400..=499 => LogLevel::Warn,
        _ => LogLevel::Debug,
    };
    let context = context_from([("status", json!(status)), ("durationMs", json!(elapsed_ms))]);
    if let Err(e) = logger.log(level, "Request completed", &context) {
        tracing::error!(error = %e, "Failed to write request log");
    }

    response
}
