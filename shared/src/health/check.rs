//! Health check definitions and result types.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Timeout applied to checks registered without an explicit one.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_millis(5000);

/// Message recorded for a check whose probe did not finish in time.
pub const TIMEOUT_MESSAGE: &str = "Check timeout";

/// Message recorded for a check whose probe panicked.
pub const PANIC_MESSAGE: &str = "Check panicked";

/// Future returned by a probe invocation.
pub type ProbeFuture = BoxFuture<'static, anyhow::Result<bool>>;

/// Asynchronous health predicate.
///
/// Resolves to `Ok(true)` when healthy, `Ok(false)` when unhealthy, or an error
/// describing why the probe itself failed.
pub type Probe = Arc<dyn Fn() -> ProbeFuture + Send + Sync>;

/// Category a check belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    /// Is the process fundamentally alive.
    Liveness,
    /// Can the process currently serve traffic.
    Readiness,
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Liveness => write!(f, "liveness"),
            Self::Readiness => write!(f, "readiness"),
        }
    }
}

/// A named probe with its timeout.
#[derive(Clone)]
pub struct HealthCheck {
    /// Name, unique within its category.
    pub name: String,
    /// The probe to run.
    pub probe: Probe,
    /// How long the probe may run before it is recorded as timed out.
    pub timeout: Duration,
}

impl std::fmt::Debug for HealthCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthCheck")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HealthCheck {
    /// Creates a check with [`DEFAULT_CHECK_TIMEOUT`].
    ///
    /// # Example
    ///
    /// ```
    /// use shared::health::HealthCheck;
    /// use std::time::Duration;
    ///
    /// let check = HealthCheck::new("database", || async { Ok(true) })
    ///     .with_timeout(Duration::from_millis(250));
    /// assert_eq!(check.timeout, Duration::from_millis(250));
    /// ```
    #[must_use]
    pub fn new<F, Fut>(name: impl Into<String>, probe: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        Self {
            name: name.into(),
            probe: Arc::new(move || -> ProbeFuture { Box::pin(probe()) }),
            timeout: DEFAULT_CHECK_TIMEOUT,
        }
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Health of a single check or of the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// The probe reported healthy.
    Healthy,
    /// The probe reported unhealthy, failed, or timed out.
    Unhealthy,
}

impl CheckStatus {
    /// Returns true if healthy.
    #[must_use]
    pub fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Outcome of one check in one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    /// Recorded status.
    pub status: CheckStatus,
    /// Failure or timeout detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Wall-clock time from dispatch to settlement, in milliseconds.
    pub duration_ms: u64,
}

impl CheckResult {
    /// A healthy result.
    #[must_use]
    pub fn healthy(duration_ms: u64) -> Self {
        Self {
            status: CheckStatus::Healthy,
            message: None,
            duration_ms,
        }
    }

    /// An unhealthy result with an optional message.
    #[must_use]
    pub fn unhealthy(message: Option<String>, duration_ms: u64) -> Self {
        Self {
            status: CheckStatus::Unhealthy,
            message,
            duration_ms,
        }
    }
}

/// Aggregated result of running every check in a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Unhealthy if any check is unhealthy.
    pub status: CheckStatus,
    /// When aggregation completed.
    pub timestamp: DateTime<Utc>,
    /// Per-check results, keyed by check name.
    pub checks: BTreeMap<String, CheckResult>,
}

impl HealthStatus {
    /// Aggregates check results, stamping the current time.
    #[must_use]
    pub fn from_checks(checks: BTreeMap<String, CheckResult>) -> Self {
        let status = if checks.values().all(|c| c.status.is_healthy()) {
            CheckStatus::Healthy
        } else {
            CheckStatus::Unhealthy
        };

        Self {
            status,
            timestamp: Utc::now(),
            checks,
        }
    }

    /// Returns true if every check is healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }
}
