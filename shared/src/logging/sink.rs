//! Output sinks for serialized log records.

use super::LogLevel;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Destination for serialized log lines.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait LogSink: Send + Sync {
    /// Writes a single serialized record. `line` carries no trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream rejects the write.
    fn write_line(&self, level: LogLevel, line: &str) -> io::Result<()>;
}

/// Writes warnings and errors to stderr, everything else to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioSink;

impl LogSink for StdioSink {
    fn write_line(&self, level: LogLevel, line: &str) -> io::Result<()> {
        if level.is_diagnostic() {
            let mut stderr = io::stderr().lock();
            writeln!(stderr, "{line}")
        } else {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{line}")
        }
    }
}

/// Captures log lines in memory.
///
/// This is useful for testing.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured lines in emission order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, line)| line.clone())
            .collect()
    }

    /// Returns captured lines parsed back into JSON values.
    ///
    /// Lines that are not valid JSON are skipped.
    #[must_use]
    pub fn records(&self) -> Vec<serde_json::Value> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// Returns the levels of captured lines in emission order.
    #[must_use]
    pub fn levels(&self) -> Vec<LogLevel> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(level, _)| *level)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, level: LogLevel, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, line.to_string()));
        Ok(())
    }
}
