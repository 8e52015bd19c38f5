//! Liveness and readiness checks.
//!
//! A [`HealthRegistry`] holds named probes in two independent categories and
//! runs a whole category on demand, producing a fresh [`HealthStatus`] every
//! time. Nothing is cached between invocations.

mod check;
mod registry;

pub use check::{
    CheckKind, CheckResult, CheckStatus, HealthCheck, HealthStatus, Probe, ProbeFuture,
    DEFAULT_CHECK_TIMEOUT, PANIC_MESSAGE, TIMEOUT_MESSAGE,
};
pub use registry::HealthRegistry;
