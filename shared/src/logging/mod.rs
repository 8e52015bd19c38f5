//! Structured JSON-line logger with trace correlation.
//!
//! A [`Logger`] carries a service name, a standing context merged into every
//! record, and an optional trace id. Each call builds a [`LogRecord`] and
//! writes it synchronously to a [`LogSink`] as a single JSON line.
//!
//! # Example
//!
//! ```
//! use shared::logging::{context_from, Logger, MemorySink};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::new());
//! let mut logger = Logger::with_sink("billing", sink.clone())
//!     .with_context(context_from([("region", "eu")]));
//! let trace_id = logger.generate_trace_id();
//!
//! logger.info("invoice created").unwrap();
//!
//! let record = &sink.records()[0];
//! assert_eq!(record["context"]["region"], "eu");
//! assert_eq!(record["traceId"], trace_id.as_str());
//! ```

mod record;
mod sink;

pub use record::{context_from, Context, LogLevel, LogRecord};
pub use sink::{LogSink, MemorySink, StdioSink};

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while emitting a log record.
#[derive(Debug, Error)]
pub enum LogError {
    /// The record could not be serialized.
    #[error("Failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The sink rejected the write.
    #[error("Failed to write log record: {0}")]
    Write(#[from] std::io::Error),
}

/// Structured logger.
///
/// Cloning is cheap; clones share the sink and standing context but own their
/// trace id, so a per-request clone can carry its own correlation id.
#[derive(Clone)]
pub struct Logger {
    service: Arc<str>,
    context: Arc<Context>,
    trace_id: Option<String>,
    sink: Arc<dyn LogSink>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("service", &self.service)
            .field("context", &self.context)
            .field("trace_id", &self.trace_id)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Creates a logger writing to stdout/stderr.
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self::with_sink(service, Arc::new(StdioSink))
    }

    /// Creates a logger writing to the given sink.
    #[must_use]
    pub fn with_sink(service: impl Into<String>, sink: Arc<dyn LogSink>) -> Self {
        let service: String = service.into();
        Self {
            service: Arc::from(service),
            context: Arc::new(Context::new()),
            trace_id: None,
            sink,
        }
    }

    /// Returns a new logger whose context is this logger's context overlaid
    /// with `extra`. The trace id is inherited; `self` is left untouched.
    #[must_use]
    pub fn with_context(&self, extra: Context) -> Self {
        let mut context = (*self.context).clone();
        context.extend(extra);
        Self {
            service: Arc::clone(&self.service),
            context: Arc::new(context),
            trace_id: self.trace_id.clone(),
            sink: Arc::clone(&self.sink),
        }
    }

    /// Replaces the trace id with a fresh random one and returns it.
    pub fn generate_trace_id(&mut self) -> String {
        let id = Uuid::new_v4().to_string();
        self.trace_id = Some(id.clone());
        id
    }

    /// Sets the trace id explicitly.
    pub fn set_trace_id(&mut self, trace_id: impl Into<String>) {
        self.trace_id = Some(trace_id.into());
    }

    /// Returns the current trace id, if any.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Returns the standing context.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the service name stamped on every record.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Builds the record a call to [`Logger::log`] would emit, without writing it.
    #[must_use]
    pub fn record(&self, level: LogLevel, message: impl Into<String>, extra: &Context) -> LogRecord {
        let mut context = (*self.context).clone();
        context.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));

        LogRecord {
            timestamp: Utc::now(),
            level,
            service: self.service.to_string(),
            message: message.into(),
            context,
            trace_id: self.trace_id.clone(),
        }
    }

    /// Emits a record at `level`. Keys in `extra` win over the standing context.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    pub fn log(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        extra: &Context,
    ) -> Result<(), LogError> {
        let record = self.record(level, message, extra);
        let line = serde_json::to_string(&record)?;
        self.sink.write_line(level, &line)?;
        Ok(())
    }

    /// Emits a debug record.
    ///
    /// # Errors
    ///
    /// See [`Logger::log`].
    pub fn debug(&self, message: impl Into<String>) -> Result<(), LogError> {
        self.log(LogLevel::Debug, message, &Context::new())
    }

    /// Emits an info record.
    ///
    /// # Errors
    ///
    /// See [`Logger::log`].
    pub fn info(&self, message: impl Into<String>) -> Result<(), LogError> {
        self.log(LogLevel::Info, message, &Context::new())
    }

    /// Emits a warning record.
    ///
    /// # Errors
    ///
    /// See [`Logger::log`].
    pub fn warn(&self, message: impl Into<String>) -> Result<(), LogError> {
        self.log(LogLevel::Warn, message, &Context::new())
    }

    /// Emits an error record.
    ///
    /// # Errors
    ///
    /// See [`Logger::log`].
    pub fn error(&self, message: impl Into<String>) -> Result<(), LogError> {
        self.log(LogLevel::Error, message, &Context::new())
    }
}
