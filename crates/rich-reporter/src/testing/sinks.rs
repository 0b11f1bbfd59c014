//! Sinks for exercising the pipeline in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::SinkError;
use crate::level::Level;
use crate::record::LogRecord;
use crate::sink::Sink;

/// Keeps a clone of every record it accepts.
#[derive(Debug)]
pub struct RecordingSink {
    name: String,
    records: Mutex<Vec<LogRecord>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::named("recording")
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }

    #[must_use]
    pub fn levels(&self) -> Vec<Level> {
        self.records().into_iter().map(|r| r.level).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn accept(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureMode {
    Error,
    Panic,
}

/// Fails every delivery and flush, either with [`SinkError::Rejected`] or by
/// panicking.
#[derive(Debug)]
pub struct FailingSink {
    mode: FailureMode,
    attempts: AtomicUsize,
}

impl FailingSink {
    /// Returns an error from every `accept`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: FailureMode::Error,
            attempts: AtomicUsize::new(0),
        }
    }

    /// Panics inside every `accept`.
    #[must_use]
    pub fn panicking() -> Self {
        Self {
            mode: FailureMode::Panic,
            attempts: AtomicUsize::new(0),
        }
    }

    /// How many deliveries were attempted.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Relaxed)
    }
}

impl Default for FailingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    fn accept(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        match self.mode {
            FailureMode::Error => Err(SinkError::Rejected(format!(
                "refusing {} record",
                record.level
            ))),
            FailureMode::Panic => panic!("sink exploded on '{}'", record.message),
        }
    }

    fn flush(&self) -> Result<(), SinkError> {
        match self.mode {
            FailureMode::Error => Err(SinkError::Rejected("refusing flush".to_string())),
            FailureMode::Panic => panic!("sink exploded on flush"),
        }
    }
}
