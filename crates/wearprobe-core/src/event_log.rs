//! Append-only, timestamped log of harness events.

use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

/// A single log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub recorded_at: DateTime<Local>,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.recorded_at.format("%H:%M:%S"), self.message)
    }
}

/// Chronologically ordered log entries.
///
/// Entries are never edited or removed individually; [`EventLog::clear`] is
/// the only way the log shrinks. `generation` is bumped on every clear so a
/// surface tailing the log by index can tell that its cursor is stale.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<LogEntry>,
    generation: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` stamped with the current wall-clock time.
    pub fn append(&mut self, message: impl Into<String>) {
        let entry = LogEntry {
            recorded_at: Local::now(),
            message: message.into(),
        };
        tracing::info!(target: "wearprobe::log", "{entry}");
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
