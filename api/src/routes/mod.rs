//! API route definitions.
//!
//! This module organizes all HTTP routes for the Vitals API server.

mod health;
mod metrics;
mod simulate;

pub use health::health_routes;
pub use metrics::{metrics_routes, PROMETHEUS_CONTENT_TYPE};
pub use simulate::{simulate_routes, SimulateRequest, SimulateResponse, FAULT_CHECK};
