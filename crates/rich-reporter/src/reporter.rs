//! The reporter façade.
//!
//! A [`Reporter`] owns one [`EventPipeline`] and exposes leveled logging,
//! free-form display output, statistics snapshots and the summary report.
//!
//! # Example
//!
//! ```ignore
//! use rich_reporter::{Level, Reporter};
//!
//! let reporter = Reporter::builder("ingest")
//!     .min_level(Level::Debug)
//!     .persist_to("ingest.log")
//!     .build()?;
//!
//! reporter.info("starting");
//! reporter.warning("slow batch");
//! let counts = reporter.report();
//! assert_eq!(counts[Level::Warning], 1);
//! ```

use std::error::Error;
use std::io::Write;
use std::ops::Deref;
use std::panic::Location;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::ReporterConfig;
use crate::console::ReporterConsole;
use crate::detection::{DisplayContext, should_enable_rich};
use crate::error::{InvalidLevelError, ReporterError, ReporterResult};
use crate::level::Level;
use crate::logging::targets;
use crate::pipeline::{Admission, EventPipeline, RecordExtras};
use crate::record::{FailureContext, SourceLocation};
use crate::sink::{PlainSink, RenderedSink, Sink};
use crate::stats::LevelCounts;
use crate::summary::Summary;

/// Title used by [`Reporter::report`] and by scoped guards.
pub const DEFAULT_TITLE: &str = "Report Summary";

/// Build a reporter from a [`ReporterConfig`].
///
/// Each call returns an independent reporter; two reporters with the same
/// name share nothing.
pub fn get_reporter(name: impl Into<String>, config: &ReporterConfig) -> ReporterResult<Reporter> {
    Reporter::builder(name).with_config(config).build()
}

/// Leveled logging with per-level statistics.
#[derive(Debug)]
pub struct Reporter {
    pipeline: EventPipeline,
}

impl Reporter {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ReporterBuilder {
        ReporterBuilder::new(name)
    }

    // ─────────────────────────────────────────────────
    // Leveled Logging
    // ─────────────────────────────────────────────────

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.emit(Level::Debug, message.into(), None);
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.emit(Level::Info, message.into(), None);
    }

    #[track_caller]
    pub fn warning(&self, message: impl Into<String>) {
        self.emit(Level::Warning, message.into(), None);
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.emit(Level::Error, message.into(), None);
    }

    #[track_caller]
    pub fn critical(&self, message: impl Into<String>) {
        self.emit(Level::Critical, message.into(), None);
    }

    #[track_caller]
    pub fn log(&self, level: Level, message: impl Into<String>) {
        self.emit(level, message.into(), None);
    }

    /// Log at a level given by name (`"warning"`, `"ERROR"`, ...).
    ///
    /// An unknown name is a caller error and is returned, not dropped.
    #[track_caller]
    pub fn try_log(&self, level: &str, message: impl Into<String>) -> Result<(), InvalidLevelError> {
        let level: Level = level.parse()?;
        self.emit(level, message.into(), None);
        Ok(())
    }

    /// ERROR record carrying `error`, its source chain and a backtrace when
    /// `RUST_BACKTRACE` enables one. Counted under ERROR.
    #[track_caller]
    pub fn exception(&self, message: impl Into<String>, error: &(dyn Error + 'static)) {
        self.emit(Level::Error, message.into(), Some(FailureContext::capture(error)));
    }

    #[track_caller]
    fn emit(&self, level: Level, message: String, failure: Option<FailureContext>) {
        let location = SourceLocation::from(Location::caller());
        self.pipeline.submit_with(
            level,
            message,
            RecordExtras {
                target: None,
                location: Some(location),
                failure,
            },
        );
    }

    /// Entry point for the `log`/`tracing` bridges.
    pub(crate) fn forward(
        &self,
        level: Level,
        message: String,
        target: &str,
        location: Option<SourceLocation>,
    ) -> Admission {
        self.pipeline.submit_with(
            level,
            message,
            RecordExtras {
                target: Some(target.to_string()),
                location,
                failure: None,
            },
        )
    }

    // ─────────────────────────────────────────────────
    // Free-form Output (never filtered, never counted)
    // ─────────────────────────────────────────────────

    /// Print markup (`[bold green]ok[/]`) on the display surface.
    pub fn display(&self, content: &str) {
        self.pipeline.rendered().display(content);
    }

    /// Print text as-is; brackets are not interpreted.
    pub fn display_plain(&self, text: &str) {
        self.console().print_plain(text);
    }

    /// Horizontal rule, titled unless `title` is empty.
    pub fn rule(&self, title: &str) {
        self.console().rule((!title.is_empty()).then_some(title));
    }

    // ─────────────────────────────────────────────────
    // Statistics
    // ─────────────────────────────────────────────────

    #[must_use]
    pub fn snapshot(&self) -> LevelCounts {
        self.pipeline.snapshot()
    }

    /// Render the per-level table under `title`, then return the counts.
    ///
    /// Read-only: repeated calls render and return the same thing.
    pub fn summarize(&self, title: &str) -> LevelCounts {
        let counts = self.snapshot();
        let summary = Summary::new(title, &counts);
        if let Err(e) = self.pipeline.rendered().render_summary(&summary) {
            log::warn!(
                target: targets::REPORTER,
                "reporter '{}': failed to render summary: {}",
                self.name(),
                e
            );
        }
        counts
    }

    /// [`summarize`](Self::summarize) with [`DEFAULT_TITLE`].
    pub fn report(&self) -> LevelCounts {
        self.summarize(DEFAULT_TITLE)
    }

    /// Zero every count, returning what was cleared.
    pub fn reset(&self) -> LevelCounts {
        self.pipeline.reset()
    }

    /// Sink failures contained so far.
    #[must_use]
    pub fn delivery_failures(&self) -> u64 {
        self.pipeline.delivery_failures()
    }

    // ─────────────────────────────────────────────────
    // Scoped Use
    // ─────────────────────────────────────────────────

    /// Guard that prints the summary exactly once when it goes out of scope,
    /// including during a panic unwind.
    #[must_use = "the summary is printed when the guard is dropped"]
    pub fn scoped(&self) -> ReportGuard<'_> {
        ReportGuard {
            reporter: self,
            armed: true,
        }
    }

    /// Run `f` with a scoped guard; the summary follows `f` however it exits.
    pub fn scope<T>(&self, f: impl FnOnce(&Reporter) -> T) -> T {
        let guard = self.scoped();
        f(&guard)
    }

    // ─────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────

    #[must_use]
    pub fn name(&self) -> &str {
        self.pipeline.name()
    }

    #[must_use]
    pub fn min_level(&self) -> Level {
        self.pipeline.min_level()
    }

    #[must_use]
    pub fn console(&self) -> &Arc<ReporterConsole> {
        self.pipeline.rendered().console()
    }

    /// Attached sinks in fan-out order.
    #[must_use]
    pub fn sink_names(&self) -> Vec<&str> {
        self.pipeline.sink_names()
    }

    pub fn flush(&self) {
        self.pipeline.flush();
    }
}

/// Prints the default summary when dropped.
///
/// Derefs to the [`Reporter`], so the guard is used in place of it.
#[derive(Debug)]
pub struct ReportGuard<'a> {
    reporter: &'a Reporter,
    armed: bool,
}

impl ReportGuard<'_> {
    /// Print the summary now instead of at drop.
    pub fn finish(mut self) -> LevelCounts {
        self.armed = false;
        self.reporter.report()
    }
}

impl Deref for ReportGuard<'_> {
    type Target = Reporter;

    fn deref(&self) -> &Reporter {
        self.reporter
    }
}

impl Drop for ReportGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.armed = false;
            self.reporter.report();
        }
    }
}

/// Builder for [`Reporter`].
///
/// The rendered sink is always attached first, the plain sink (if any)
/// second, then sinks added with [`with_sink`](Self::with_sink).
pub struct ReporterBuilder {
    name: String,
    min_level: Level,
    console: Option<Arc<ReporterConsole>>,
    context: Option<DisplayContext>,
    show_time: bool,
    show_path: bool,
    enable_persistence: bool,
    persistence_path: Option<PathBuf>,
    persistence_writer: Option<Arc<Mutex<dyn Write + Send>>>,
    extra_sinks: Vec<Arc<dyn Sink>>,
}

impl ReporterBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_level: Level::Info,
            console: None,
            context: None,
            show_time: true,
            show_path: false,
            enable_persistence: false,
            persistence_path: None,
            persistence_writer: None,
            extra_sinks: Vec::new(),
        }
    }

    /// Copy every option from `config`.
    #[must_use]
    pub fn with_config(mut self, config: &ReporterConfig) -> Self {
        self.min_level = config.min_level;
        self.show_time = config.render_timestamps;
        self.show_path = config.render_source_location;
        self.enable_persistence = config.enable_persistence;
        if config.persistence_path.is_some() {
            self.persistence_writer = None;
        }
        self.persistence_path.clone_from(&config.persistence_path);
        self.context = Some(config.resolve_context());
        self
    }

    #[must_use]
    pub fn min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Draw on an existing console instead of a new stderr one.
    #[must_use]
    pub fn console(mut self, console: Arc<ReporterConsole>) -> Self {
        self.console = Some(console);
        self
    }

    /// Styling for the console created at build time. Ignored when a console
    /// is supplied.
    #[must_use]
    pub fn context(mut self, context: DisplayContext) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn show_time(mut self, show: bool) -> Self {
        self.show_time = show;
        self
    }

    #[must_use]
    pub fn show_path(mut self, show: bool) -> Self {
        self.show_path = show;
        self
    }

    /// Toggle persistence. Enabling it without a destination makes
    /// [`build`](Self::build) fail.
    #[must_use]
    pub fn persistence(mut self, enable: bool) -> Self {
        self.enable_persistence = enable;
        self
    }

    /// Persist to a file, appending and creating it if absent.
    ///
    /// Replaces any writer set by [`persist_to_writer`](Self::persist_to_writer);
    /// the destination set last wins.
    #[must_use]
    pub fn persist_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.enable_persistence = true;
        self.persistence_path = Some(path.into());
        self.persistence_writer = None;
        self
    }

    /// Persist to a caller-owned writer; it is never closed by the reporter.
    ///
    /// Replaces any path set by [`persist_to`](Self::persist_to).
    #[must_use]
    pub fn persist_to_writer(mut self, writer: Arc<Mutex<dyn Write + Send>>) -> Self {
        self.enable_persistence = true;
        self.persistence_writer = Some(writer);
        self.persistence_path = None;
        self
    }

    /// Attach an extra sink after the built-in ones.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.extra_sinks.push(sink);
        self
    }

    /// Validate the options and assemble the reporter.
    ///
    /// # Errors
    ///
    /// [`ReporterError::MissingPersistencePath`] when persistence is enabled
    /// without a destination, [`ReporterError::OpenPersistence`] when the file
    /// cannot be opened.
    pub fn build(self) -> ReporterResult<Reporter> {
        let mut sinks: Vec<Arc<dyn Sink>> = Vec::with_capacity(self.extra_sinks.len() + 1);
        if self.enable_persistence {
            sinks.push(Arc::new(self.open_plain_sink()?));
        }
        sinks.extend(self.extra_sinks);

        let console = self.console.unwrap_or_else(|| {
            let styled = self
                .context
                .map_or_else(should_enable_rich, |c| c.is_styled());
            Arc::new(ReporterConsole::with_styling(styled))
        });
        let rendered = Arc::new(
            RenderedSink::new(console)
                .with_timestamps(self.show_time)
                .with_source_location(self.show_path),
        );

        let pipeline = EventPipeline::new(self.name, self.min_level, rendered, sinks);
        log::debug!(
            target: targets::REPORTER,
            "built reporter '{}' (min_level={}, sinks={:?})",
            pipeline.name(),
            pipeline.min_level(),
            pipeline.sink_names()
        );

        Ok(Reporter { pipeline })
    }

    fn open_plain_sink(&self) -> ReporterResult<PlainSink> {
        if let Some(writer) = &self.persistence_writer {
            return Ok(PlainSink::shared(writer.clone()));
        }
        let path = self
            .persistence_path
            .as_ref()
            .ok_or(ReporterError::MissingPersistencePath)?;
        PlainSink::open(path).map_err(|source| ReporterError::OpenPersistence {
            path: path.clone(),
            source,
        })
    }
}

impl std::fmt::Debug for ReporterBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReporterBuilder")
            .field("name", &self.name)
            .field("min_level", &self.min_level)
            .field("show_time", &self.show_time)
            .field("show_path", &self.show_path)
            .field("enable_persistence", &self.enable_persistence)
            .field("persistence_path", &self.persistence_path)
            .field("extra_sinks", &self.extra_sinks.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSink, TestConsole};

    fn reporter(tc: &TestConsole, min: Level) -> Reporter {
        Reporter::builder("unit")
            .console(tc.shared())
            .show_time(false)
            .min_level(min)
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let tc = TestConsole::new();
        let r = Reporter::builder("svc").console(tc.shared()).build().unwrap();
        assert_eq!(r.name(), "svc");
        assert_eq!(r.min_level(), Level::Info);
        assert_eq!(r.sink_names(), vec!["rendered"]);
        assert_eq!(r.snapshot(), LevelCounts::new());
        assert!(r.pipeline.rendered().shows_timestamps());
        assert!(!r.pipeline.rendered().shows_source_location());
    }

    #[test]
    fn test_missing_persistence_path_fails_fast() {
        let err = Reporter::builder("svc").persistence(true).build().unwrap_err();
        assert!(matches!(err, ReporterError::MissingPersistencePath));
    }

    #[test]
    fn test_unopenable_persistence_path_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("x.log");
        let err = Reporter::builder("svc").persist_to(&path).build().unwrap_err();
        match err {
            ReporterError::OpenPersistence { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_sink_order() {
        let tc = TestConsole::new();
        let buffer: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let r = Reporter::builder("svc")
            .console(tc.shared())
            .with_sink(Arc::new(RecordingSink::named("extra")))
            .persist_to_writer(buffer)
            .build()
            .unwrap();
        assert_eq!(r.sink_names(), vec!["rendered", "plain", "extra"]);
    }

    #[test]
    fn test_leveled_calls_render_and_count() {
        let tc = TestConsole::new();
        let r = reporter(&tc, Level::Debug);
        r.debug("d");
        r.info("i");
        r.warning("w");
        r.error("e");
        r.critical("c");
        r.log(Level::Info, "again");

        let counts = r.snapshot();
        assert_eq!(counts.get(Level::Info), 2);
        assert_eq!(counts.total(), 6);
        tc.assert_contains("WARNING  w");
        tc.assert_contains("CRITICAL c");
    }

    #[test]
    fn test_try_log_rejects_unknown_level() {
        let tc = TestConsole::new();
        let r = reporter(&tc, Level::Debug);
        assert!(r.try_log("warn", "ok").is_ok());
        let err = r.try_log("loud", "nope").unwrap_err();
        assert_eq!(err.value(), "loud");
        assert_eq!(r.snapshot().total(), 1);
    }

    #[test]
    fn test_exception_counts_as_error() {
        let tc = TestConsole::new();
        let r = reporter(&tc, Level::Info);
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml missing");
        r.exception("load failed", &err);

        assert_eq!(r.snapshot().get(Level::Error), 1);
        assert_eq!(r.snapshot().total(), 1);
        tc.assert_contains("ERROR    load failed");
        tc.assert_contains("╰─▶ config.toml missing");
    }

    #[test]
    fn test_source_location_is_the_call_site() {
        let tc = TestConsole::new();
        let recorder = Arc::new(RecordingSink::new());
        let r = Reporter::builder("svc")
            .console(tc.shared())
            .with_sink(recorder.clone())
            .build()
            .unwrap();

        let expected = line!() + 1;
        r.info("here");

        let location = recorder.records()[0].location.clone().unwrap();
        assert_eq!(location.line, expected);
        assert_eq!(location.file_name(), "reporter.rs");
    }

    #[test]
    fn test_display_is_not_counted_or_filtered() {
        let tc = TestConsole::new();
        let r = reporter(&tc, Level::Critical);
        r.display("[bold]status[/] ok");
        r.display_plain("[literal]");
        r.rule("Section");

        assert_eq!(r.snapshot().total(), 0);
        tc.assert_contains("status ok");
        tc.assert_not_contains("[bold]");
        tc.assert_contains("[literal]");
        tc.assert_contains(" Section ");
    }

    #[test]
    fn test_summarize_is_read_only() {
        let tc = TestConsole::new();
        let r = reporter(&tc, Level::Debug);
        r.warning("w");
        r.error("e");

        tc.clear();
        let first = r.summarize("Run");
        let first_render = tc.output();
        tc.clear();
        let second = r.summarize("Run");

        assert_eq!(first, second);
        assert_eq!(first_render, tc.output());
        assert_eq!(first_render[0], "=== Run ===");
        assert_eq!(r.snapshot(), first);
    }

    #[test]
    fn test_reset_returns_cleared_counts() {
        let tc = TestConsole::new();
        let r = reporter(&tc, Level::Debug);
        r.info("a");
        r.info("b");
        assert_eq!(r.reset().get(Level::Info), 2);
        assert_eq!(r.snapshot().total(), 0);
    }

    #[test]
    fn test_scoped_guard_reports_once() {
        let tc = TestConsole::new();
        let r = reporter(&tc, Level::Info);
        {
            let scoped = r.scoped();
            scoped.info("inside");
        }
        assert_eq!(tc.count_lines_containing(DEFAULT_TITLE), 1);
    }

    #[test]
    fn test_guard_finish_disarms() {
        let tc = TestConsole::new();
        let r = reporter(&tc, Level::Info);
        let guard = r.scoped();
        guard.error("x");
        let counts = guard.finish();
        assert_eq!(counts.get(Level::Error), 1);
        assert_eq!(tc.count_lines_containing(DEFAULT_TITLE), 1);
    }

    #[test]
    fn test_scope_closure_reports_after_panic() {
        let tc = TestConsole::new();
        let r = reporter(&tc, Level::Info);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            r.scope(|r| {
                r.info("before");
                if r.min_level() == Level::Info {
                    panic!("aborted");
                }
            });
        }));
        assert!(result.is_err());
        assert_eq!(tc.count_lines_containing(DEFAULT_TITLE), 1);
        assert_eq!(r.snapshot().get(Level::Info), 1);
    }

    #[test]
    fn test_last_persistence_destination_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last.log");
        let buffer: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let tc = TestConsole::new();

        let to_file = Reporter::builder("file")
            .console(tc.shared())
            .persist_to_writer(buffer.clone())
            .persist_to(&path)
            .build()
            .unwrap();
        to_file.warning("on disk");
        drop(to_file);
        assert!(buffer.lock().unwrap().is_empty());
        assert!(std::fs::read_to_string(&path).unwrap().contains(" - file - WARNING - on disk"));

        let to_writer = Reporter::builder("buf")
            .console(tc.shared())
            .persist_to(dir.path().join("unused.log"))
            .persist_to_writer(buffer.clone())
            .build()
            .unwrap();
        to_writer.warning("in memory");
        drop(to_writer);
        let text = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(text.contains(" - buf - WARNING - in memory"));
        assert!(!dir.path().join("unused.log").exists());
    }

    #[test]
    fn test_get_reporter_uses_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReporterConfig::new()
            .with_min_level(Level::Warning)
            .with_timestamps(false)
            .with_source_location(true)
            .plain_mode()
            .persist_to(dir.path().join("r.log"));
        let r = get_reporter("cfg", &config).unwrap();
        assert_eq!(r.min_level(), Level::Warning);
        assert!(!r.pipeline.rendered().shows_timestamps());
        assert!(r.pipeline.rendered().shows_source_location());
        assert!(!r.console().is_styled());
        assert_eq!(r.sink_names(), vec!["rendered", "plain"]);
    }
}
