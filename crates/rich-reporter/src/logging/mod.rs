//! Bridges from the `log` and `tracing` ecosystems.
//!
//! - [`ReporterLogger`] - a `log` crate logger that forwards into a [`Reporter`]
//! - [`ReporterLayer`] - a `tracing` layer that does the same for events
//!
//! Forwarded records are filtered, counted and rendered exactly like direct
//! calls. Records from this crate's own targets (see [`targets`]) are never
//! forwarded.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rich_reporter::{Reporter, logging::ReporterLogger};
//!
//! let reporter = Arc::new(Reporter::builder("app").build()?);
//! ReporterLogger::init(reporter.clone())?;
//!
//! log::warn!("disk almost full");
//! assert_eq!(reporter.snapshot()[rich_reporter::Level::Warning], 1);
//! ```
//!
//! [`Reporter`]: crate::reporter::Reporter

mod logger;
mod subscriber;

use crate::level::Level;

pub use logger::{ReporterLogger, ReporterLoggerBuilder};
pub use subscriber::{ReporterLayer, ReporterSubscriberBuilder};

/// `log` targets used for the crate's own diagnostics.
pub mod targets {
    /// Prefix shared by every internal target.
    pub const ROOT: &str = "rich_reporter";
    /// Reporter construction and summary rendering.
    pub const REPORTER: &str = "rich_reporter::reporter";
    /// Contained sink failures.
    pub const PIPELINE: &str = "rich_reporter::pipeline";

    /// Whether `target` belongs to this crate.
    #[must_use]
    pub fn is_internal(target: &str) -> bool {
        target
            .strip_prefix(ROOT)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    }
}

/// TRACE folds into DEBUG, so a DEBUG floor lets it through.
pub(crate) fn level_filter(level: Level) -> log::LevelFilter {
    match level {
        Level::Debug => log::LevelFilter::Trace,
        Level::Info => log::LevelFilter::Info,
        Level::Warning => log::LevelFilter::Warn,
        Level::Error | Level::Critical => log::LevelFilter::Error,
    }
}
