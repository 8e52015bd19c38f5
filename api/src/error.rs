//! Handler error type.
//!
//! Every failure a handler can hit maps to a 500 with a generic body; the
//! underlying cause is only written to the process diagnostics.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use shared::logging::LogError;
use thiserror::Error;

/// Errors returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The health checks could not be run at all.
    #[error("Health check failed")]
    HealthCheck,

    /// The metrics snapshot could not be produced.
    #[error("Error collecting metrics")]
    Metrics,

    /// The structured logger failed to emit a record.
    #[error("Failed to write log record: {0}")]
    Logging(#[from] LogError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");

        match self {
            Self::HealthCheck => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": "Health check failed",
                })),
            )
                .into_response(),
            Self::Metrics => (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                "Error collecting metrics\n",
            )
                .into_response(),
            Self::Logging(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Internal server error",
                })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health_check_error_body() {
        let response = ApiError::HealthCheck.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Health check failed");
    }

    #[tokio::test]
    async fn test_metrics_error_is_plain_text() {
        let response = ApiError::Metrics.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_string(response).await, "Error collecting metrics\n");
    }

    #[tokio::test]
    async fn test_logging_error_hides_detail() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let response = ApiError::from(LogError::from(io)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body_string(response).await.contains("stdout closed"));
    }
}
