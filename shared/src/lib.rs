//! Vitals Shared Library
//!
//! Process-health reporting facade used by the Vitals admin server: structured
//! logging, an in-process metrics registry, and liveness/readiness checks.
//!
//! # Modules
//!
//! - [`logging`] - JSON-line structured logger with trace correlation
//! - [`metrics`] - Counters, gauges and histograms with Prometheus text export
//! - [`health`] - Named asynchronous checks run concurrently with timeouts
//!
//! # Example
//!
//! ```
//! use shared::metrics::MetricsRegistry;
//!
//! let metrics = MetricsRegistry::new();
//! metrics.observe_http("GET", "/users", 200, 42.0);
//!
//! assert!(metrics.render().contains("http_requests_total"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod health;
pub mod logging;
pub mod metrics;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
