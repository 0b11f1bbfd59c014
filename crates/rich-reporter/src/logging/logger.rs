//! `log` crate logger that forwards into a reporter.
//!
//! # Usage
//!
//! ```ignore
//! use rich_reporter::logging::{ReporterLogger, ReporterLoggerBuilder};
//!
//! // Floor taken from the reporter
//! ReporterLogger::init(reporter.clone())?;
//!
//! // Or use the builder for more control
//! ReporterLoggerBuilder::new(reporter)
//!     .level_filter(log::LevelFilter::Warn)
//!     .with_file_line(false)
//!     .init()?;
//! ```

use std::sync::Arc;

use log::{LevelFilter, Log, Metadata, Record};

use super::{level_filter, targets};
use crate::level::Level;
use crate::record::SourceLocation;
use crate::reporter::Reporter;

/// Forwards `log` records to a shared [`Reporter`].
///
/// TRACE and DEBUG map to DEBUG, WARN to WARNING. The reporter's own floor
/// still applies after this logger's filter.
pub struct ReporterLogger {
    reporter: Arc<Reporter>,
    filter: LevelFilter,
    file_line: bool,
}

impl ReporterLogger {
    /// Logger whose filter matches the reporter's floor.
    #[must_use]
    pub fn new(reporter: Arc<Reporter>) -> Self {
        ReporterLoggerBuilder::new(reporter).build()
    }

    #[must_use]
    pub fn builder(reporter: Arc<Reporter>) -> ReporterLoggerBuilder {
        ReporterLoggerBuilder::new(reporter)
    }

    /// Install as the global logger.
    ///
    /// Returns an error if a logger has already been set.
    pub fn init(reporter: Arc<Reporter>) -> Result<(), log::SetLoggerError> {
        ReporterLoggerBuilder::new(reporter).init()
    }

    /// Install as the global logger, ignoring errors if already set.
    pub fn try_init(reporter: Arc<Reporter>) {
        let _ = Self::init(reporter);
    }

    #[must_use]
    pub fn reporter(&self) -> &Arc<Reporter> {
        &self.reporter
    }

    fn location(&self, record: &Record<'_>) -> Option<SourceLocation> {
        if !self.file_line {
            return None;
        }
        match (record.file(), record.line()) {
            (Some(file), Some(line)) => Some(SourceLocation::new(file, line)),
            _ => None,
        }
    }
}

impl Log for ReporterLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.filter && !targets::is_internal(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        self.reporter.forward(
            Level::from(record.level()),
            record.args().to_string(),
            record.target(),
            self.location(record),
        );
    }

    fn flush(&self) {
        self.reporter.flush();
    }
}

impl std::fmt::Debug for ReporterLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReporterLogger")
            .field("reporter", &self.reporter.name())
            .field("filter", &self.filter)
            .field("file_line", &self.file_line)
            .finish()
    }
}

/// Builder for configuring the reporter logger.
#[derive(Debug)]
pub struct ReporterLoggerBuilder {
    reporter: Arc<Reporter>,
    filter: LevelFilter,
    file_line: bool,
}

impl ReporterLoggerBuilder {
    #[must_use]
    pub fn new(reporter: Arc<Reporter>) -> Self {
        let filter = level_filter(reporter.min_level());
        Self {
            reporter,
            filter,
            file_line: true,
        }
    }

    /// Filter applied before forwarding; also set as `log::max_level` on init.
    #[must_use]
    pub fn level_filter(mut self, filter: LevelFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Carry `file:line` from the record (shown only if the reporter
    /// renders source locations).
    #[must_use]
    pub fn with_file_line(mut self, enable: bool) -> Self {
        self.file_line = enable;
        self
    }

    /// Build the logger without installing it.
    #[must_use]
    pub fn build(self) -> ReporterLogger {
        ReporterLogger {
            reporter: self.reporter,
            filter: self.filter,
            file_line: self.file_line,
        }
    }

    /// Build and install as the global logger.
    ///
    /// Returns an error if a logger has already been set.
    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let filter = self.filter;
        log::set_boxed_logger(Box::new(self.build()))?;
        log::set_max_level(filter);
        Ok(())
    }

    /// Build and install, ignoring errors if already set.
    pub fn try_init(self) {
        let _ = self.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSink, TestConsole};

    fn reporter(min: Level, recorder: &Arc<RecordingSink>) -> (Arc<Reporter>, TestConsole) {
        let tc = TestConsole::new();
        let reporter = Reporter::builder("bridge")
            .console(tc.shared())
            .show_time(false)
            .min_level(min)
            .with_sink(recorder.clone())
            .build()
            .unwrap();
        (Arc::new(reporter), tc)
    }

    fn metadata(level: log::Level, target: &str) -> Metadata<'_> {
        Metadata::builder().level(level).target(target).build()
    }

    #[test]
    fn test_filter_follows_reporter_floor() {
        let recorder = Arc::new(RecordingSink::new());
        let (reporter, _tc) = reporter(Level::Warning, &recorder);
        let logger = ReporterLogger::new(reporter);

        assert!(logger.enabled(&metadata(log::Level::Error, "app")));
        assert!(logger.enabled(&metadata(log::Level::Warn, "app")));
        assert!(!logger.enabled(&metadata(log::Level::Info, "app")));
        assert!(!logger.enabled(&metadata(log::Level::Trace, "app")));
    }

    #[test]
    fn test_internal_targets_are_ignored() {
        let recorder = Arc::new(RecordingSink::new());
        let (reporter, _tc) = reporter(Level::Debug, &recorder);
        let logger = ReporterLogger::new(reporter);

        assert!(!logger.enabled(&metadata(log::Level::Warn, targets::PIPELINE)));
        assert!(logger.enabled(&metadata(log::Level::Warn, "rich_reporter_cli")));
    }

    #[test]
    fn test_records_are_forwarded_and_counted() {
        let recorder = Arc::new(RecordingSink::new());
        let (reporter, tc) = reporter(Level::Debug, &recorder);
        let logger = ReporterLogger::new(reporter.clone());

        logger.log(
            &Record::builder()
                .args(format_args!("cache miss for {}", "user:7"))
                .level(log::Level::Warn)
                .target("app::cache")
                .file(Some("src/cache.rs"))
                .line(Some(88))
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("tick"))
                .level(log::Level::Trace)
                .target("app")
                .build(),
        );

        assert_eq!(reporter.snapshot().get(Level::Warning), 1);
        assert_eq!(reporter.snapshot().get(Level::Debug), 1);
        tc.assert_contains("WARNING  cache miss for user:7");

        let first = &recorder.records()[0];
        assert_eq!(first.target.as_deref(), Some("app::cache"));
        assert_eq!(first.location, Some(SourceLocation::new("src/cache.rs", 88)));
    }

    #[test]
    fn test_builder_overrides() {
        let recorder = Arc::new(RecordingSink::new());
        let (reporter, _tc) = reporter(Level::Debug, &recorder);
        let logger = ReporterLogger::builder(reporter)
            .level_filter(LevelFilter::Error)
            .with_file_line(false)
            .build();

        assert!(!logger.enabled(&metadata(log::Level::Warn, "app")));
        logger.log(
            &Record::builder()
                .args(format_args!("boom"))
                .level(log::Level::Error)
                .target("app")
                .file(Some("src/x.rs"))
                .line(Some(1))
                .build(),
        );
        assert_eq!(recorder.records()[0].location, None);
    }
}
