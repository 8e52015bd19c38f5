//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context as _, Result};
use std::net::SocketAddr;
use std::time::Duration;
use validator::Validate;

/// Output format for process diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl From<&str> for LogFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `VITALS_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `VITALS_PORT`: The port to listen on (default: 8080)
/// - `VITALS_SERVICE_NAME`: Service name stamped on log records (default: "vitals-api")
/// - `VITALS_CHECK_TIMEOUT_MS`: Timeout for checks registered at startup (default: 5000)
/// - `VITALS_LOG_FORMAT`: `pretty` or `json` (default: "pretty")
#[derive(Debug, Clone, Validate)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Service name stamped on every structured log record.
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,
    /// Timeout for health checks registered by the server.
    #[validate(range(min = 1, message = "Check timeout must be at least 1ms"))]
    pub check_timeout_ms: u64,
    /// Output format for process diagnostics.
    pub log_format: LogFormat,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `VITALS_PORT` or `VITALS_CHECK_TIMEOUT_MS` is set but cannot be parsed
    /// - The resulting configuration fails validation
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = std::env::var("VITALS_HOST").unwrap_or(defaults.host);

        let port = std::env::var("VITALS_PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("Invalid VITALS_PORT")?
            .unwrap_or(defaults.port);

        let service_name =
            std::env::var("VITALS_SERVICE_NAME").unwrap_or(defaults.service_name);

        let check_timeout_ms = std::env::var("VITALS_CHECK_TIMEOUT_MS")
            .ok()
            .map(|t| t.parse::<u64>())
            .transpose()
            .context("Invalid VITALS_CHECK_TIMEOUT_MS")?
            .unwrap_or(defaults.check_timeout_ms);

        let log_format = std::env::var("VITALS_LOG_FORMAT")
            .map(|f| LogFormat::from(f.as_str()))
            .unwrap_or_default();

        let config = Self {
            host,
            port,
            service_name,
            check_timeout_ms,
            log_format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port combination is not a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Returns the check timeout as a `Duration`.
    #[must_use]
    pub fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            service_name: "vitals-api".to_string(),
            check_timeout_ms: 5000,
            log_format: LogFormat::Pretty,
        }
    }
}
