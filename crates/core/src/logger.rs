// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostic severities and pluggable log sinks.
//!
//! The engine decides *when* to log from a segment's effective debug/verbose
//! levels (see [`Level::enabled`]); sinks only decide *where* lines go.
//! Sink failures must never break the pipeline.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// Terminating failure; reported once, then surfaced to the caller.
    Error,
    /// Reported, execution continues.
    Warn,
    /// Emitted when the segment's effective `verbose > 0` or `debug > 0`.
    Info,
    /// Emitted when the segment's effective `debug > 0`.
    Debug,
}

impl Level {
    /// Gating rule: should a line at this level be emitted for a segment
    /// with the given effective debug/verbose levels?
    pub fn enabled(self, debug: u32, verbose: u32) -> bool {
        match self {
            Level::Error | Level::Warn => true,
            Level::Info => debug > 0 || verbose > 0,
            Level::Debug => debug > 0,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        };
        write!(f, "{name}")
    }
}

/// A diagnostic sink.
///
/// `segment` is the full path of the emitting segment. `items` carries
/// formatted item context and is empty unless the segment's effective
/// `verbose > 1`.
pub trait Logger {
    fn write(&self, level: Level, segment: &str, message: &str, items: &[String]);
}

/// Default sink: routes lines to `tracing` events at the matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn write(&self, level: Level, segment: &str, message: &str, items: &[String]) {
        match level {
            Level::Error => tracing::error!(segment, ?items, "{message}"),
            Level::Warn => tracing::warn!(segment, ?items, "{message}"),
            Level::Info => tracing::info!(segment, ?items, "{message}"),
            Level::Debug => tracing::debug!(segment, ?items, "{message}"),
        }
    }
}

/// One captured log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: Level,
    pub segment: String,
    pub message: String,
    pub items: Vec<String>,
}

/// Capturing sink for tests and embedders.
///
/// Clones share the same buffer, so a test can keep one handle and hand the
/// other to the engine.
#[derive(Debug, Default, Clone)]
pub struct MemoryLogger {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything captured so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// True if any captured message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.records.lock().iter().any(|r| r.message.contains(needle))
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Logger for MemoryLogger {
    fn write(&self, level: Level, segment: &str, message: &str, items: &[String]) {
        self.records.lock().push(LogRecord {
            level,
            segment: segment.to_string(),
            message: message.to_string(),
            items: items.to_vec(),
        });
    }
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
