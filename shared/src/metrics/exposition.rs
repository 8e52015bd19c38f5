//! Prometheus text exposition format rendering.

use super::labels::label_segment;
use super::registry::{MetricKind, Series, KNOWN_FAMILIES};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Cumulative histogram bucket thresholds, in seconds.
pub const HISTOGRAM_BUCKETS: [f64; 4] = [0.1, 0.5, 1.0, 5.0];

/// Quantiles reported for every histogram series.
pub const HISTOGRAM_QUANTILES: [f64; 3] = [0.5, 0.95, 0.99];

pub(super) fn render(series: &Series) -> String {
    let mut out = String::new();

    render_simple(&mut out, MetricKind::Counter, &series.counters);
    render_simple(&mut out, MetricKind::Gauge, &series.gauges);
    render_histograms(&mut out, &series.histograms);

    out
}

fn render_simple(
    out: &mut String,
    kind: MetricKind,
    families: &BTreeMap<String, BTreeMap<String, f64>>,
) {
    for family in KNOWN_FAMILIES.iter().filter(|f| f.kind == kind) {
        write_header(out, family.name, family.help, kind);
        if let Some(series) = families.get(family.name) {
            write_simple_series(out, family.name, series);
        }
    }

    for (name, series) in families {
        if is_known(name, kind) {
            continue;
        }
        write_header(out, name, &format!("Application {kind} {name}"), kind);
        write_simple_series(out, name, series);
    }
}

fn render_histograms(
    out: &mut String,
    families: &BTreeMap<String, BTreeMap<String, Vec<f64>>>,
) {
    let kind = MetricKind::Histogram;
    for family in KNOWN_FAMILIES.iter().filter(|f| f.kind == kind) {
        write_header(out, family.name, family.help, kind);
        if let Some(series) = families.get(family.name) {
            write_histogram_series(out, family.name, series);
        }
    }

    for (name, series) in families {
        if is_known(name, kind) || series.values().all(Vec::is_empty) {
            continue;
        }
        write_header(out, name, &format!("Application {kind} {name}"), kind);
        write_histogram_series(out, name, series);
    }
}

fn is_known(name: &str, kind: MetricKind) -> bool {
    KNOWN_FAMILIES
        .iter()
        .any(|f| f.name == name && f.kind == kind)
}

// Writing into a String is infallible, so the fmt::Result values below are discarded.

fn write_header(out: &mut String, name: &str, help: &str, kind: MetricKind) {
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} {kind}");
}

fn write_simple_series(out: &mut String, name: &str, series: &BTreeMap<String, f64>) {
    for (labels, value) in series {
        let _ = writeln!(
            out,
            "{name}{} {}",
            label_segment(labels, None),
            format_value(*value)
        );
    }
}

fn write_histogram_series(out: &mut String, name: &str, series: &BTreeMap<String, Vec<f64>>) {
    for (labels, observations) in series {
        if observations.is_empty() {
            continue;
        }

        let mut sorted = observations.clone();
        sorted.sort_by(f64::total_cmp);
        let plain = label_segment(labels, None);
        let sum: f64 = sorted.iter().sum();

        let _ = writeln!(out, "{name}_sum{plain} {}", format_value(sum));
        let _ = writeln!(out, "{name}_count{plain} {}", sorted.len());

        for threshold in HISTOGRAM_BUCKETS {
            let le = format_value(threshold);
            let count = sorted.partition_point(|v| *v <= threshold);
            let _ = writeln!(
                out,
                "{name}_bucket{} {count}",
                label_segment(labels, Some(("le", le.as_str())))
            );
        }
        let _ = writeln!(
            out,
            "{name}_bucket{} {}",
            label_segment(labels, Some(("le", "+Inf"))),
            sorted.len()
        );

        for quantile in HISTOGRAM_QUANTILES {
            let q = format_value(quantile);
            let _ = writeln!(
                out,
                "{name}{} {}",
                label_segment(labels, Some(("quantile", q.as_str()))),
                format_value(percentile(&sorted, quantile))
            );
        }
    }
}

/// Nearest-rank percentile without interpolation: `sorted[floor(n * p)]`.
///
/// `sorted` must be non-empty and ascending.
pub(super) fn percentile(sorted: &[f64], p: f64) -> f64 {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let index = (sorted.len() as f64 * p).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}

/// Formats a sample value the way Prometheus expects.
pub(super) fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}
