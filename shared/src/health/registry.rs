//! Health check registry and concurrent execution.

use super::check::{
    CheckKind, CheckResult, HealthCheck, HealthStatus, PANIC_MESSAGE, TIMEOUT_MESSAGE,
};
use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Registry of liveness and readiness checks.
///
/// Registering a name that already exists in the same category replaces the
/// previous check. Running a category dispatches every probe concurrently,
/// each raced against its own timeout, and waits for all of them to settle.
///
/// # Example
///
/// ```
/// use shared::health::{CheckStatus, HealthRegistry};
///
/// # tokio_test::block_on(async {
/// let health = HealthRegistry::new();
/// health.register_liveness("app", || async { Ok(true) });
/// health.register_liveness("flaky", || async { Ok(false) });
///
/// let report = health.check_liveness().await;
/// assert_eq!(report.status, CheckStatus::Unhealthy);
/// assert_eq!(report.checks["app"].status, CheckStatus::Healthy);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct HealthRegistry {
    liveness: RwLock<HashMap<String, HealthCheck>>,
    readiness: RwLock<HashMap<String, HealthCheck>>,
}

impl HealthRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a check in the given category.
    pub fn register(&self, kind: CheckKind, check: HealthCheck) {
        let previous = self
            .checks(kind)
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(check.name.clone(), check);

        if let Some(previous) = previous {
            tracing::debug!(%kind, name = %previous.name, "Replaced health check");
        }
    }

    /// Registers a liveness check with the default timeout.
    pub fn register_liveness<F, Fut>(&self, name: impl Into<String>, probe: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        self.register(CheckKind::Liveness, HealthCheck::new(name, probe));
    }

    /// Registers a readiness check with the default timeout.
    pub fn register_readiness<F, Fut>(&self, name: impl Into<String>, probe: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        self.register(CheckKind::Readiness, HealthCheck::new(name, probe));
    }

    /// Registers a liveness check that is failed after `timeout`.
    pub fn register_liveness_with_timeout<F, Fut>(
        &self,
        name: impl Into<String>,
        probe: F,
        timeout: Duration,
    ) where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        self.register(
            CheckKind::Liveness,
            HealthCheck::new(name, probe).with_timeout(timeout),
        );
    }

    /// Registers a readiness check that is failed after `timeout`.
    pub fn register_readiness_with_timeout<F, Fut>(
        &self,
        name: impl Into<String>,
        probe: F,
        timeout: Duration,
    ) where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<bool>> + Send + 'static,
    {
        self.register(
            CheckKind::Readiness,
            HealthCheck::new(name, probe).with_timeout(timeout),
        );
    }

    /// Returns the names registered in a category, sorted.
    #[must_use]
    pub fn names(&self, kind: CheckKind) -> Vec<String> {
        let mut names: Vec<String> = self
            .checks(kind)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Returns the registered liveness check names, sorted.
    #[must_use]
    pub fn liveness_checks(&self) -> Vec<String> {
        self.names(CheckKind::Liveness)
    }

    /// Returns the registered readiness check names, sorted.
    #[must_use]
    pub fn readiness_checks(&self) -> Vec<String> {
        self.names(CheckKind::Readiness)
    }

    /// Runs every liveness check.
    pub async fn check_liveness(&self) -> HealthStatus {
        self.check(CheckKind::Liveness).await
    }

    /// Runs every readiness check.
    pub async fn check_readiness(&self) -> HealthStatus {
        self.check(CheckKind::Readiness).await
    }

    /// Runs every check in a category concurrently and aggregates the results.
    ///
    /// Never fails: probe errors, panics and timeouts are recorded as
    /// unhealthy entries. Returns once every probe has settled or timed out.
    pub async fn check(&self, kind: CheckKind) -> HealthStatus {
        // Snapshot so the lock is not held across await points.
        let checks: Vec<HealthCheck> = self
            .checks(kind)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let results: BTreeMap<String, CheckResult> = join_all(checks.into_iter().map(run_check))
            .await
            .into_iter()
            .collect();

        let status = HealthStatus::from_checks(results);
        if !status.is_healthy() {
            tracing::warn!(%kind, "Health checks reported unhealthy");
        }
        status
    }

    fn checks(&self, kind: CheckKind) -> &RwLock<HashMap<String, HealthCheck>> {
        match kind {
            CheckKind::Liveness => &self.liveness,
            CheckKind::Readiness => &self.readiness,
        }
    }
}

/// Runs one probe on its own task, raced against the check's timeout.
///
/// A probe still running at the deadline is aborted; its eventual outcome
/// cannot affect the recorded result.
async fn run_check(check: HealthCheck) -> (String, CheckResult) {
    let started = Instant::now();
    let probe = check.probe;
    let mut task = tokio::spawn(async move { probe().await });

    let outcome = tokio::time::timeout(check.timeout, &mut task).await;
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let result = match outcome {
        Ok(Ok(Ok(true))) => CheckResult::healthy(duration_ms),
        Ok(Ok(Ok(false))) => CheckResult::unhealthy(None, duration_ms),
        Ok(Ok(Err(e))) => {
            tracing::warn!(name = %check.name, error = %e, "Health check failed");
            CheckResult::unhealthy(Some(e.to_string()), duration_ms)
        }
        Ok(Err(e)) => {
            tracing::error!(name = %check.name, error = %e, "Health check task did not complete");
            let message = if e.is_panic() {
                PANIC_MESSAGE.to_string()
            } else {
                e.to_string()
            };
            CheckResult::unhealthy(Some(message), duration_ms)
        }
        Err(_) => {
            task.abort();
            tracing::warn!(
                name = %check.name,
                timeout = ?check.timeout,
                "Health check timed out"
            );
            CheckResult::unhealthy(Some(TIMEOUT_MESSAGE.to_string()), duration_ms)
        }
    };

    (check.name, result)
}
