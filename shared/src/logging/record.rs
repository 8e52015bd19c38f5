//! Log record data model.
//!
//! Defines the `LogRecord` emitted by [`Logger`](super::Logger) for every log call.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Key-value context attached to log records.
///
/// Ordered so that serialized records are stable across runs.
pub type Context = BTreeMap<String, serde_json::Value>;

/// Builds a [`Context`] from key-value pairs.
///
/// # Example
///
/// ```
/// use shared::logging::context_from;
///
/// let ctx = context_from([("user_id", "42"), ("action", "login")]);
/// assert_eq!(ctx["user_id"], "42");
/// ```
pub fn context_from<I, K, V>(pairs: I) -> Context
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Log severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug information.
    Debug,
    /// Informational messages.
    Info,
    /// Warning conditions.
    Warn,
    /// Error conditions.
    Error,
}

impl LogLevel {
    /// Returns true for levels routed to the error stream.
    #[must_use]
    pub fn is_diagnostic(self) -> bool {
        matches!(self, Self::Warn | Self::Error)
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

/// A single structured log record.
///
/// Serialized as one JSON object per line, e.g.
///
/// ```json
/// {"timestamp":"2024-05-01T12:00:00.000Z","level":"info","service":"vitals-api","message":"ready","traceId":"..."}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// When the record was created, rendered as ISO-8601 UTC with millisecond precision.
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,

    /// Severity level.
    pub level: LogLevel,

    /// Name of the emitting service.
    pub service: String,

    /// Free-text message.
    pub message: String,

    /// Merged logger and call-site context.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: Context,

    /// Correlation id of the logical operation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

fn serialize_timestamp<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}
