//! Persistent, unstyled record lines.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::Sink;
use crate::error::SinkError;
use crate::record::LogRecord;

/// `2026-01-05 14:03:22,417`
pub const PLAIN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

enum Destination {
    /// Opened by the sink; flushed and closed when the sink is dropped.
    Owned(BufWriter<File>),
    /// Supplied by the caller; never closed here.
    Shared(Arc<Mutex<dyn Write + Send>>),
}

/// Writes `timestamp - reporter - LEVEL - message`, one record per line.
pub struct PlainSink {
    destination: Mutex<Destination>,
    path: Option<PathBuf>,
}

impl PlainSink {
    /// Open `path` for appending, creating it if absent.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            destination: Mutex::new(Destination::Owned(BufWriter::new(file))),
            path: Some(path.to_path_buf()),
        })
    }

    /// Write to a caller-owned writer.
    pub fn shared(writer: Arc<Mutex<dyn Write + Send>>) -> Self {
        Self {
            destination: Mutex::new(Destination::Shared(writer)),
            path: None,
        }
    }

    /// File path, when the sink opened one itself.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Format one record as a persisted line (without the trailing newline).
    #[must_use]
    pub fn format_line(record: &LogRecord) -> String {
        let mut line = format!(
            "{} - {} - {} - {}",
            record.timestamp.format(PLAIN_TIMESTAMP_FORMAT),
            record.reporter,
            record.level.as_str(),
            record.message
        );
        if let Some(failure) = &record.failure {
            line.push_str(" [error: ");
            line.push_str(&failure.error);
            for cause in &failure.causes {
                line.push_str("; caused by: ");
                line.push_str(cause);
            }
            line.push(']');
        }
        line
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut destination = self
            .destination
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match &mut *destination {
            Destination::Owned(file) => {
                writeln!(file, "{line}")?;
                file.flush()
            }
            Destination::Shared(writer) => {
                let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
                writeln!(writer, "{line}")?;
                writer.flush()
            }
        }
    }
}

impl Sink for PlainSink {
    fn name(&self) -> &str {
        "plain"
    }

    fn accept(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.write_line(&Self::format_line(record))?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        let mut destination = self
            .destination
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match &mut *destination {
            Destination::Owned(file) => file.flush()?,
            Destination::Shared(writer) => writer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .flush()?,
        }
        Ok(())
    }
}

impl std::fmt::Debug for PlainSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlainSink")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
