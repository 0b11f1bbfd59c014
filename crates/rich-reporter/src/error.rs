//! Error types.
//!
//! Construction problems surface as [`ReporterError`] and are fatal to
//! construction. Per-record sink problems are [`SinkError`]s; the pipeline
//! contains them and they never reach the caller of a logging call.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for fallible reporter operations.
pub type ReporterResult<T> = Result<T, ReporterError>;

/// Errors raised while building a reporter or loading its configuration.
#[derive(Debug, Error)]
pub enum ReporterError {
    /// Persistence was enabled without a destination.
    #[error("persistence_path must be provided when persistence is enabled")]
    MissingPersistencePath,

    /// The persistence destination could not be opened or created.
    #[error("cannot open log file {}: {source}", .path.display())]
    OpenPersistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A configuration source could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A configured level name outside the five known levels.
    #[error(transparent)]
    InvalidLevel(#[from] InvalidLevelError),
}

/// A level name or numeric severity that does not name one of the five levels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level '{value}' (expected one of DEBUG, INFO, WARNING, ERROR, CRITICAL)")]
pub struct InvalidLevelError {
    value: String,
}

impl InvalidLevelError {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The rejected input.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Failure while delivering one record to one sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("write failed: {0}")]
    Io(#[from] io::Error),

    #[error("sink panicked: {0}")]
    Panicked(String),

    #[error("record rejected: {0}")]
    Rejected(String),
}
