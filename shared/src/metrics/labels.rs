//! Label-set canonicalization.

use std::collections::BTreeMap;

/// Canonical form of the empty label set.
///
/// Every non-empty label set renders at least one `key="value"` pair, so the
/// empty string never collides with a real combination.
pub const NO_LABELS: &str = "";

/// Canonicalizes a label set into a stable map key.
///
/// Keys are sorted lexicographically and rendered as `key="value"` pairs joined
/// by commas. Values are escaped the same way the Prometheus text format
/// escapes them; keys additionally escape `=` and `,`, so distinct label sets
/// never share a canonical form. If a key appears twice the last value wins.
///
/// # Example
///
/// ```
/// use shared::metrics::canonical_labels;
///
/// let a = canonical_labels(&[("b", "2"), ("a", "1")]);
/// let b = canonical_labels(&[("a", "1"), ("b", "2")]);
/// assert_eq!(a, b);
/// assert_eq!(a, r#"a="1",b="2""#);
/// ```
#[must_use]
pub fn canonical_labels(labels: &[(&str, &str)]) -> String {
    if labels.is_empty() {
        return NO_LABELS.to_string();
    }

    let sorted: BTreeMap<&str, &str> = labels.iter().copied().collect();
    sorted
        .into_iter()
        .map(|(key, value)| {
            format!(
                "{}=\"{}\"",
                escape_label_key(key),
                escape_label_value(value)
            )
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Renders the `{...}` segment for a series, appending `extra` pairs after the
/// canonical labels. Returns an empty string when there is nothing to render.
pub(crate) fn label_segment(canonical: &str, extra: Option<(&str, &str)>) -> String {
    match (canonical.is_empty(), extra) {
        (true, None) => String::new(),
        (true, Some((key, value))) => format!("{{{key}=\"{value}\"}}"),
        (false, None) => format!("{{{canonical}}}"),
        (false, Some((key, value))) => format!("{{{canonical},{key}=\"{value}\"}}"),
    }
}

// Valid label names pass through unchanged.
fn escape_label_key(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '\\' | '"' | '=' | ',' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}
