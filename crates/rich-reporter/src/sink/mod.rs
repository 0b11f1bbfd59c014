//! Output destinations for admitted records.
//!
//! - [`RenderedSink`] - styled lines on a [`ReporterConsole`](crate::console::ReporterConsole)
//! - [`PlainSink`] - timestamped, unstyled lines on a file or shared writer
//!
//! Any type implementing [`Sink`] can be attached with
//! [`ReporterBuilder::with_sink`](crate::reporter::ReporterBuilder::with_sink).

mod plain;
mod rendered;

pub use plain::{PLAIN_TIMESTAMP_FORMAT, PlainSink};
pub use rendered::RenderedSink;

use crate::error::SinkError;
use crate::record::LogRecord;

/// Destination for admitted records.
///
/// `accept` is called with the reporter's pipeline lock held, in attachment
/// order. Returning an error (or panicking) only affects this sink: the record
/// is still counted and the remaining sinks still receive it.
pub trait Sink: Send + Sync {
    /// Short name used when reporting delivery failures.
    fn name(&self) -> &str;

    fn accept(&self, record: &LogRecord) -> Result<(), SinkError>;

    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
