//! Application state module.
//!
//! The composition root: owns the one logger, metrics registry and health
//! registry of the process and hands them to route handlers.

use shared::health::{CheckKind, HealthCheck, HealthRegistry, DEFAULT_CHECK_TIMEOUT};
use shared::logging::Logger;
use shared::metrics::MetricsRegistry;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Liveness check registered at startup.
pub const PROCESS_CHECK: &str = "process";

/// Readiness check registered at startup.
pub const SERVER_CHECK: &str = "server";

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Root structured logger; request handlers derive from it.
    logger: Logger,
    /// Process-wide metrics.
    metrics: Arc<MetricsRegistry>,
    /// Process-wide health checks.
    health: Arc<HealthRegistry>,
    /// Timeout applied to checks registered by the server itself.
    check_timeout: Duration,
    started_at: Instant,
}

impl AppState {
    /// Creates a new application state with empty registries.
    #[must_use]
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            metrics: Arc::new(MetricsRegistry::new()),
            health: Arc::new(HealthRegistry::new()),
            check_timeout: DEFAULT_CHECK_TIMEOUT,
            started_at: Instant::now(),
        }
    }

    /// Sets the timeout used for server-registered checks.
    #[must_use]
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    /// Registers the checks every server starts with.
    pub fn register_default_checks(&self) {
        self.register_static_check(CheckKind::Liveness, PROCESS_CHECK, true);
        self.register_static_check(CheckKind::Readiness, SERVER_CHECK, true);
    }

    /// Registers (or replaces) a check whose probe always returns `healthy`.
    pub fn register_static_check(&self, kind: CheckKind, name: &str, healthy: bool) {
        self.health.register(
            kind,
            HealthCheck::new(name, move || async move { Ok(healthy) })
                .with_timeout(self.check_timeout),
        );
    }

    /// Returns the root logger.
    #[must_use]
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Returns the metrics registry.
    #[must_use]
    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Returns the health registry.
    #[must_use]
    pub fn health(&self) -> &Arc<HealthRegistry> {
        &self.health
    }

    /// Returns the timeout used for server-registered checks.
    #[must_use]
    pub fn check_timeout(&self) -> Duration {
        self.check_timeout
    }

    /// Returns how long ago this state was created.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::logging::MemorySink;

    fn test_state() -> AppState {
        AppState::new(Logger::with_sink("test", Arc::new(MemorySink::new())))
    }

    #[tokio::test]
    async fn test_default_checks_are_healthy() {
        let state = test_state();
        state.register_default_checks();

        assert_eq!(state.health().liveness_checks(), vec![PROCESS_CHECK]);
        assert_eq!(state.health().readiness_checks(), vec![SERVER_CHECK]);
        assert!(state.health().check_liveness().await.is_healthy());
        assert!(state.health().check_readiness().await.is_healthy());
    }

    #[tokio::test]
    async fn test_static_check_replaces_existing() {
        let state = test_state();
        state.register_static_check(CheckKind::Readiness, "x", false);
        assert!(!state.health().check_readiness().await.is_healthy());

        state.register_static_check(CheckKind::Readiness, "x", true);
        assert!(state.health().check_readiness().await.is_healthy());
    }

    #[test]
    fn test_app_state_is_clone() {
        let state = test_state();
        let state2 = state.clone();

        // Both should share the same registries
        state.metrics().counter("shared", 1.0, &[]);
        assert_eq!(state2.metrics().counter_value("shared", &[]), Some(1.0));
    }

    #[test]
    fn test_check_timeout_override() {
        let state = test_state().with_check_timeout(Duration::from_millis(250));
        assert_eq!(state.check_timeout(), Duration::from_millis(250));
    }
}
