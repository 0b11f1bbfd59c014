//! The transient record handed to sinks.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::level::Level;

/// One admitted log call.
///
/// Records are built by the pipeline after admission, passed by reference to
/// every attached sink, then dropped.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
    /// Assigned when the record is admitted.
    pub timestamp: DateTime<Local>,
    /// Name of the reporter that emitted the record.
    pub reporter: Arc<str>,
    /// Originating module or `log`/`tracing` target, when known.
    pub target: Option<String>,
    pub location: Option<SourceLocation>,
    /// Set by `Reporter::exception`.
    pub failure: Option<FailureContext>,
}

impl LogRecord {
    /// Create a record stamped with the current local time.
    #[must_use]
    pub fn new(level: Level, message: impl Into<String>, reporter: Arc<str>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Local::now(),
            reporter,
            target: None,
            location: None,
            failure: None,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub fn with_failure(mut self, failure: Option<FailureContext>) -> Self {
        self.failure = failure;
        self
    }
}

/// File and line a record was emitted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Just the file name, without directories.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.file)
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_name(), self.line)
    }
}

/// Failure details attached to an exception record.
#[derive(Debug, Clone)]
pub struct FailureContext {
    /// Display text of the error itself.
    pub error: String,
    /// Display text of each `source()` in the chain, outermost first.
    pub causes: Vec<String>,
    /// Rendered backtrace, present only when backtraces are enabled.
    pub backtrace: Option<String>,
}

impl FailureContext {
    /// Capture an error, its source chain and (if enabled) a backtrace.
    #[must_use]
    pub fn capture(error: &(dyn Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        let backtrace = Backtrace::capture();
        let backtrace = (backtrace.status() == BacktraceStatus::Captured)
            .then(|| backtrace.to_string());

        Self {
            error: error.to_string(),
            causes,
            backtrace,
        }
    }
}
