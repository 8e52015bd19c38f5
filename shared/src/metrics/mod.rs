//! In-process metrics: counters, gauges and histograms with Prometheus text export.
//!
//! - [`MetricsRegistry`] - thread-safe series store and renderer
//! - [`canonical_labels`] - label-set canonicalization shared by all series

mod exposition;
mod labels;
mod registry;

pub use exposition::{HISTOGRAM_BUCKETS, HISTOGRAM_QUANTILES};
pub use labels::{canonical_labels, NO_LABELS};
pub use registry::{
    MetricFamily, MetricKind, MetricsRegistry, HTTP_ERRORS_TOTAL, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION_SECONDS, KNOWN_FAMILIES, PROCESS_UPTIME_SECONDS,
};
