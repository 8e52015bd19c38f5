//! In-memory metrics registry.
//!
//! Stores counters, gauges and histogram observations keyed by metric name and
//! canonical label set. Every update takes the write lock exactly once, so a
//! concurrent [`MetricsRegistry::render`] always sees whole updates.

use super::exposition;
use super::labels::canonical_labels;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Total HTTP requests, labeled by method, path and status.
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
/// HTTP responses with status >= 400, labeled by method, path and status.
pub const HTTP_ERRORS_TOTAL: &str = "http_errors_total";
/// HTTP request duration in seconds, labeled by method and path.
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
/// Seconds since the process started.
pub const PROCESS_UPTIME_SECONDS: &str = "process_uptime_seconds";

/// Type of metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// A value that only moves by addition (e.g., request count).
    Counter,
    /// A last-write-wins value (e.g., memory usage).
    Gauge,
    /// A sequence of observations (e.g., request latency).
    Histogram,
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Counter => write!(f, "counter"),
            Self::Gauge => write!(f, "gauge"),
            Self::Histogram => write!(f, "histogram"),
        }
    }
}

/// A metric family whose HELP/TYPE header is always rendered.
#[derive(Debug, Clone, Copy)]
pub struct MetricFamily {
    /// Metric name.
    pub name: &'static str,
    /// Metric kind.
    pub kind: MetricKind,
    /// HELP text.
    pub help: &'static str,
}

/// Families rendered by every snapshot, in output order within their kind.
pub const KNOWN_FAMILIES: &[MetricFamily] = &[
    MetricFamily {
        name: HTTP_REQUESTS_TOTAL,
        kind: MetricKind::Counter,
        help: "Total number of HTTP requests",
    },
    MetricFamily {
        name: HTTP_ERRORS_TOTAL,
        kind: MetricKind::Counter,
        help: "Total number of HTTP error responses",
    },
    MetricFamily {
        name: PROCESS_UPTIME_SECONDS,
        kind: MetricKind::Gauge,
        help: "Process uptime in seconds",
    },
    MetricFamily {
        name: HTTP_REQUEST_DURATION_SECONDS,
        kind: MetricKind::Histogram,
        help: "HTTP request duration in seconds",
    },
];

/// Raw series storage, keyed by metric name then canonical label set.
#[derive(Debug, Default)]
pub(super) struct Series {
    pub(super) counters: BTreeMap<String, BTreeMap<String, f64>>,
    pub(super) gauges: BTreeMap<String, BTreeMap<String, f64>>,
    pub(super) histograms: BTreeMap<String, BTreeMap<String, Vec<f64>>>,
}

impl Series {
    fn kinds(&self, name: &str) -> Vec<MetricKind> {
        let mut kinds = Vec::new();
        if self.counters.contains_key(name) {
            kinds.push(MetricKind::Counter);
        }
        if self.gauges.contains_key(name) {
            kinds.push(MetricKind::Gauge);
        }
        if self.histograms.contains_key(name) {
            kinds.push(MetricKind::Histogram);
        }
        kinds
    }

    /// Warns when a new family reuses a name held by another kind; the
    /// exposition then carries two header blocks for that name.
    fn note_family(&self, name: &str, kind: MetricKind) {
        let existing = self.kinds(name);
        if existing.contains(&kind) {
            return;
        }
        let known = KNOWN_FAMILIES
            .iter()
            .find(|f| f.name == name && f.kind != kind)
            .map(|f| f.kind);
        if let Some(other) = existing.first().copied().or(known) {
            tracing::warn!(
                name,
                %kind,
                existing = %other,
                "Metric name already used by another kind"
            );
        }
    }
}

/// Process-wide metrics registry.
///
/// Safe to share across threads behind an `Arc`.
///
/// # Example
///
/// ```
/// use shared::metrics::MetricsRegistry;
///
/// let metrics = MetricsRegistry::new();
/// metrics.counter("jobs_total", 5.0, &[("queue", "mail")]);
/// metrics.counter("jobs_total", 3.0, &[("queue", "mail")]);
///
/// assert_eq!(metrics.counter_value("jobs_total", &[("queue", "mail")]), Some(8.0));
/// assert!(metrics.render().contains(r#"jobs_total{queue="mail"} 8"#));
/// ```
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    series: RwLock<Series>,
}

impl MetricsRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to a counter, creating it at zero first if absent.
    ///
    /// `delta` is not checked for sign.
    pub fn counter(&self, name: &str, delta: f64, labels: &[(&str, &str)]) {
        let key = canonical_labels(labels);
        let mut series = self.write();
        series.note_family(name, MetricKind::Counter);
        *series
            .counters
            .entry(name.to_string())
            .or_default()
            .entry(key)
            .or_insert(0.0) += delta;
    }

    /// Sets a gauge, overwriting any previous value.
    pub fn gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        let key = canonical_labels(labels);
        let mut series = self.write();
        series.note_family(name, MetricKind::Gauge);
        series
            .gauges
            .entry(name.to_string())
            .or_default()
            .insert(key, value);
    }

    /// Appends an observation to a histogram.
    pub fn histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        let key = canonical_labels(labels);
        let mut series = self.write();
        series.note_family(name, MetricKind::Histogram);
        series
            .histograms
            .entry(name.to_string())
            .or_default()
            .entry(key)
            .or_default()
            .push(value);
    }

    /// Records one served HTTP request.
    ///
    /// Increments [`HTTP_REQUESTS_TOTAL`], observes the response time (converted
    /// to seconds) in [`HTTP_REQUEST_DURATION_SECONDS`], and for status codes of
    /// 400 and above increments [`HTTP_ERRORS_TOTAL`].
    pub fn observe_http(&self, method: &str, path: &str, status_code: u16, response_time_ms: f64) {
        let status = status_code.to_string();
        let request_labels = [("method", method), ("path", path), ("status", status.as_str())];

        self.counter(HTTP_REQUESTS_TOTAL, 1.0, &request_labels);
        self.histogram(
            HTTP_REQUEST_DURATION_SECONDS,
            response_time_ms / 1000.0,
            &[("method", method), ("path", path)],
        );
        if status_code >= 400 {
            self.counter(HTTP_ERRORS_TOTAL, 1.0, &request_labels);
        }
    }

    /// Returns the current value of a counter series.
    #[must_use]
    pub fn counter_value(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        let key = canonical_labels(labels);
        self.read()
            .counters
            .get(name)
            .and_then(|s| s.get(&key))
            .copied()
    }

    /// Returns the current value of a gauge series.
    #[must_use]
    pub fn gauge_value(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        let key = canonical_labels(labels);
        self.read()
            .gauges
            .get(name)
            .and_then(|s| s.get(&key))
            .copied()
    }

    /// Returns the observations of a histogram series in insertion order.
    #[must_use]
    pub fn histogram_values(&self, name: &str, labels: &[(&str, &str)]) -> Option<Vec<f64>> {
        let key = canonical_labels(labels);
        self.read()
            .histograms
            .get(name)
            .and_then(|s| s.get(&key))
            .cloned()
    }

    /// Returns the kinds under which `name` currently holds data.
    #[must_use]
    pub fn kinds(&self, name: &str) -> Vec<MetricKind> {
        self.read().kinds(name)
    }

    /// Returns true if no series holds any data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let series = self.read();
        series.counters.is_empty() && series.gauges.is_empty() && series.histograms.is_empty()
    }

    /// Renders a Prometheus text-format snapshot.
    ///
    /// Output is deterministic: two calls with no update in between return
    /// identical text.
    #[must_use]
    pub fn render(&self) -> String {
        exposition::render(&self.read())
    }

    /// Clears all counters, gauges and histogram observations.
    pub fn reset(&self) {
        let mut series = self.write();
        series.counters.clear();
        series.gauges.clear();
        series.histograms.clear();
    }

    // A panic while holding the lock cannot leave a series half-written, so
    // poisoned guards are safe to reuse.
    fn read(&self) -> RwLockReadGuard<'_, Series> {
        self.series.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Series> {
        self.series.write().unwrap_or_else(PoisonError::into_inner)
    }
}
