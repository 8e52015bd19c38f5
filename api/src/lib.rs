//! Vitals API Server
//!
//! This crate provides the HTTP server exposing the process-health facade of
//! the Vitals admin dashboard: liveness/readiness probes, a Prometheus metrics
//! exporter, and fault-injection endpoints for exercising probe failures.
//!
//! # Architecture
//!
//! The API server is built on Axum and Tokio. [`AppState`] is the composition
//! root: it owns the process's single logger, metrics registry and health
//! registry and is handed to every route.
//!
//! - `GET /healthz`, `GET /readyz` - aggregated check reports (200 or 503)
//! - `GET /metrics` - Prometheus text exposition
//! - `POST /simulate-unhealthy`, `POST /restore-healthy` - fault injection
//!
//! # Example
//!
//! ```no_run
//! use api::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod error;
mod middleware;
mod routes;
mod state;

pub use config::{Config, LogFormat};
pub use error::ApiError;
pub use middleware::TRACE_ID_HEADER;
pub use routes::{SimulateRequest, SimulateResponse, FAULT_CHECK, PROMETHEUS_CONTENT_TYPE};
pub use state::{AppState, PROCESS_CHECK, SERVER_CHECK};

use anyhow::Result;
use axum::Router;
use shared::logging::{context_from, LogLevel, Logger};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Runs the Vitals API server.
///
/// This function initializes the server with configuration from environment variables
/// and starts listening for incoming connections. It handles graceful shutdown on
/// SIGTERM/SIGINT signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the Vitals API server with the provided configuration.
///
/// # Errors
///
/// Returns an error if:
/// - The configured address is invalid or cannot be bound
/// - The startup log record cannot be written
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Vitals API server starting"
    );

    let state = AppState::new(Logger::new(config.service_name.clone()))
        .with_check_timeout(config.check_timeout());
    state.register_default_checks();

    let app = create_router(state.clone());
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for connections");
    state.logger().log(
        LogLevel::Info,
        "Server started",
        &context_from([("addr", addr.to_string())]),
    )?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.logger().info("Server stopped")?;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes(state.clone()))
        .merge(routes::metrics_routes(state.clone()))
        .merge(routes::simulate_routes(state.clone()))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::observe_requests,
        ))
        .layer(TraceLayer::new_for_http())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use shared::logging::MemorySink;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> (AppState, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let state = AppState::new(Logger::with_sink("test", sink.clone()));
        state.register_default_checks();
        (state, sink)
    }

    async fn send(app: Router, request: Request<Body>) -> axum::response::Response {
        app.oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_healthz_endpoint_returns_200() {
        let (state, _sink) = test_state();
        let response = send(
            create_router(state),
            Request::builder().uri("/healthz").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_healthz_endpoint_returns_json() {
        let (state, _sink) = test_state();
        let response = send(
            create_router(state),
            Request::builder().uri("/healthz").body(Body::empty()).unwrap(),
        )
        .await;

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok());

        assert!(content_type.is_some_and(|ct| ct.contains("application/json")));
    }

    #[tokio::test]
    async fn test_requests_are_observed() {
        let (state, _sink) = test_state();
        let app = create_router(state.clone());

        send(
            app.clone(),
            Request::builder().uri("/missing").body(Body::empty()).unwrap(),
        )
        .await;

        let labels = [("method", "GET"), ("path", "/missing"), ("status", "404")];
        assert_eq!(
            state
                .metrics()
                .counter_value(shared::metrics::HTTP_REQUESTS_TOTAL, &labels),
            Some(1.0)
        );
        assert_eq!(
            state
                .metrics()
                .counter_value(shared::metrics::HTTP_ERRORS_TOTAL, &labels),
            Some(1.0)
        );
    }

    #[tokio::test]
    async fn test_scrapes_are_not_observed() {
        let (state, _sink) = test_state();
        send(
            create_router(state.clone()),
            Request::builder().uri("/metrics").body(Body::empty()).unwrap(),
        )
        .await;

        let labels = [("method", "GET"), ("path", "/metrics"), ("status", "200")];
        assert_eq!(
            state
                .metrics()
                .counter_value(shared::metrics::HTTP_REQUESTS_TOTAL, &labels),
            None
        );
    }

    #[tokio::test]
    async fn test_trace_id_is_propagated() {
        let (state, sink) = test_state();
        let response = send(
            create_router(state),
            Request::builder()
                .uri("/readyz")
                .header(TRACE_ID_HEADER, "trace-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.headers()[TRACE_ID_HEADER], "trace-42");
        let record = sink.records().pop().unwrap();
        assert_eq!(record["traceId"], "trace-42");
        assert_eq!(record["context"]["path"], "/readyz");
        assert_eq!(record["context"]["status"], 200);
    }

    #[tokio::test]
    async fn test_trace_id_is_generated() {
        let (state, sink) = test_state();
        let response = send(
            create_router(state),
            Request::builder().uri("/healthz").body(Body::empty()).unwrap(),
        )
        .await;

        let header = response.headers()[TRACE_ID_HEADER].to_str().unwrap().to_string();
        assert!(!header.is_empty());
        assert_eq!(sink.records().pop().unwrap()["traceId"], header.as_str());
    }
}
