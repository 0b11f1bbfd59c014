//! End-to-end reporter behavior: admission, statistics, persistence,
//! scoped summaries, sink isolation and concurrent use.

use std::sync::mpsc;
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;
use std::time::Duration;

use regex::Regex;
use rich_reporter::testing::{FailingSink, RecordingSink, TestConsole};
use rich_reporter::{
    DEFAULT_TITLE, Level, LevelCounts, LogRecord, Reporter, ReporterConfig, ReporterError, Sink,
    SinkError, get_reporter,
};

fn reporter(tc: &TestConsole, min: Level) -> Reporter {
    Reporter::builder("it")
        .console(tc.shared())
        .show_time(false)
        .min_level(min)
        .build()
        .expect("reporter builds")
}

fn counts(pairs: [(Level, u64); 5]) -> LevelCounts {
    pairs.into_iter().collect()
}

#[test]
fn debug_floor_counts_every_level() {
    let tc = TestConsole::new();
    let r = reporter(&tc, Level::Debug);

    for level in [
        Level::Debug,
        Level::Debug,
        Level::Info,
        Level::Info,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Error,
        Level::Critical,
        Level::Critical,
    ] {
        r.log(level, format!("{level} event"));
    }

    assert_eq!(
        r.snapshot(),
        counts([
            (Level::Debug, 2),
            (Level::Info, 3),
            (Level::Warning, 1),
            (Level::Error, 2),
            (Level::Critical, 2),
        ])
    );
    tc.assert_line_count(10);
}

#[test]
fn warning_floor_drops_lower_levels_without_output() {
    let tc = TestConsole::new();
    let r = reporter(&tc, Level::Warning);

    r.debug("d");
    r.info("i");
    let before = r.snapshot();
    assert_eq!(before.total(), 0);
    assert!(tc.output().is_empty());

    r.warning("w");
    r.error("e");
    assert_eq!(
        r.snapshot(),
        counts([
            (Level::Debug, 0),
            (Level::Info, 0),
            (Level::Warning, 1),
            (Level::Error, 1),
            (Level::Critical, 0),
        ])
    );
}

#[test]
fn persistence_without_path_is_a_configuration_error() {
    let config = ReporterConfig::new().with_persistence(true);
    let result = get_reporter("cfg", &config);
    assert!(matches!(result, Err(ReporterError::MissingPersistencePath)));
}

#[test]
fn persisted_lines_match_the_line_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");
    let tc = TestConsole::new();

    {
        let r = Reporter::builder("persist")
            .console(tc.shared())
            .persist_to(&path)
            .build()
            .unwrap();
        r.info("first");
        r.debug("below the floor");
        r.error("second");
    }

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);

    let re = Regex::new(
        r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2},\d{3} - persist - (INFO|ERROR) - (first|second)$",
    )
    .unwrap();
    assert!(re.is_match(lines[0]), "{}", lines[0]);
    assert!(re.is_match(lines[1]), "{}", lines[1]);
    assert!(lines[0].contains(" - INFO - first"));
    assert!(lines[1].contains(" - ERROR - second"));
}

#[test]
fn persistence_appends_across_reporters() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.log");
    let config = ReporterConfig::new().plain_mode().persist_to(&path);

    get_reporter("a", &config).unwrap().warning("one");
    get_reporter("b", &config).unwrap().warning("two");

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.lines().next().unwrap().contains(" - a - WARNING - one"));
}

#[test]
fn shared_writer_receives_lines_and_stays_usable() {
    let buffer: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let tc = TestConsole::new();
    {
        let r = Reporter::builder("buf")
            .console(tc.shared())
            .persist_to_writer(buffer.clone())
            .build()
            .unwrap();
        r.critical("halt");
    }
    buffer.lock().unwrap().extend_from_slice(b"trailer\n");

    let text = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert!(text.contains(" - buf - CRITICAL - halt\n"));
    assert!(text.ends_with("trailer\n"));
}

#[test]
fn reporters_with_the_same_name_are_independent() {
    let tc = TestConsole::new();
    let a = Reporter::builder("same").console(tc.shared()).build().unwrap();
    let b = Reporter::builder("same").console(tc.shared()).build().unwrap();

    a.error("only a");
    a.info("only a");

    assert_eq!(a.snapshot().total(), 2);
    assert_eq!(b.snapshot(), LevelCounts::new());
}

#[test]
fn snapshots_are_independent_copies() {
    let tc = TestConsole::new();
    let r = reporter(&tc, Level::Info);
    r.info("x");

    let mut snap = r.snapshot();
    snap[Level::Info] = 99;
    snap.set(Level::Critical, 5);

    assert_eq!(r.snapshot().get(Level::Info), 1);
    assert_eq!(r.snapshot().get(Level::Critical), 0);
}

#[test]
fn summarize_is_idempotent_and_ordered() {
    let tc = TestConsole::new();
    let r = reporter(&tc, Level::Debug);
    r.warning("w");
    r.critical("c");
    tc.clear();

    let first = r.summarize("Nightly");
    let rendered = tc.output();
    tc.clear();
    let second = r.summarize("Nightly");

    assert_eq!(first, second);
    assert_eq!(rendered, tc.output());
    assert_eq!(
        rendered,
        vec![
            "=== Nightly ===",
            "  DEBUG            0",
            "  INFO             0",
            "  WARNING          1 (!)",
            "  ERROR            0 (!!)",
            "  CRITICAL         1 (!!)",
        ]
    );
}

#[test]
fn styled_summary_is_a_titled_panel() {
    let tc = TestConsole::new_styled();
    let r = reporter(&tc, Level::Info);
    r.error("e");
    tc.clear();

    r.summarize("Demo Run Summary");

    let lines = tc.output();
    assert!(lines[0].starts_with('╭'));
    assert!(lines[0].contains(" Demo Run Summary "));
    assert!(lines.last().unwrap().starts_with('╰'));
    let levels: Vec<&str> = Level::ALL.iter().map(|l| l.as_str()).collect();
    let positions: Vec<usize> = levels
        .iter()
        .map(|name| lines.iter().position(|l| l.contains(name)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn scoped_guard_summarizes_exactly_once() {
    let tc = TestConsole::new();
    let r = reporter(&tc, Level::Info);

    {
        let guard = r.scoped();
        guard.info("work");
        guard.warning("careful");
    }

    assert_eq!(tc.count_lines_containing(DEFAULT_TITLE), 1);
    assert_eq!(r.snapshot().total(), 2);
}

#[test]
fn scoped_guard_summarizes_on_panic() {
    let tc = TestConsole::new();
    let r = reporter(&tc, Level::Info);

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let guard = r.scoped();
        guard.error("about to fail");
        let items: Vec<u32> = Vec::new();
        items[3]
    }));

    assert!(outcome.is_err());
    assert_eq!(tc.count_lines_containing(DEFAULT_TITLE), 1);
    tc.assert_contains("ERROR            1 (!!)");
}

#[test]
fn failing_sinks_do_not_affect_counts_or_other_sinks() {
    let tc = TestConsole::new();
    let failing = Arc::new(FailingSink::new());
    let panicking = Arc::new(FailingSink::panicking());
    let recorder = Arc::new(RecordingSink::new());

    let r = Reporter::builder("iso")
        .console(tc.shared())
        .show_time(false)
        .with_sink(failing.clone())
        .with_sink(panicking.clone())
        .with_sink(recorder.clone())
        .build()
        .unwrap();

    r.info("one");
    r.error("two");

    assert_eq!(r.snapshot().total(), 2);
    assert_eq!(recorder.messages(), vec!["one".to_string(), "two".to_string()]);
    assert_eq!(failing.attempts(), 2);
    assert_eq!(panicking.attempts(), 2);
    assert_eq!(r.delivery_failures(), 4);
    assert_eq!(tc.count_lines_containing("sink 'failing' failed"), 4);
    assert_eq!(r.snapshot().get(Level::Error), 1);
}

/// Summarizes its own reporter whenever an ERROR arrives.
struct AlertSink {
    reporter: OnceLock<Arc<Reporter>>,
    seen: Mutex<Vec<LevelCounts>>,
}

impl Sink for AlertSink {
    fn name(&self) -> &str {
        "alert"
    }

    fn accept(&self, record: &LogRecord) -> Result<(), SinkError> {
        if let Some(reporter) = self.reporter.get() {
            let counts = if record.level >= Level::Error {
                reporter.summarize("Alert")
            } else {
                reporter.snapshot()
            };
            self.seen.lock().unwrap().push(counts);
        }
        Ok(())
    }
}

#[test]
fn sink_can_summarize_its_own_reporter() {
    let tc = TestConsole::new();
    let alert = Arc::new(AlertSink {
        reporter: OnceLock::new(),
        seen: Mutex::new(Vec::new()),
    });
    let r = Arc::new(
        Reporter::builder("alerting")
            .console(tc.shared())
            .show_time(false)
            .with_sink(alert.clone())
            .build()
            .unwrap(),
    );
    let _ = alert.reporter.set(r.clone());

    let (tx, rx) = mpsc::channel();
    let worker = r.clone();
    thread::spawn(move || {
        worker.info("warming up");
        worker.error("disk failed");
        worker.report();
        let _ = tx.send(());
    });

    rx.recv_timeout(Duration::from_secs(5))
        .expect("logging returns while a sink summarizes");
    let seen = alert.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].get(Level::Info), 1);
    assert_eq!(seen[1].get(Level::Error), 1);
    assert_eq!(tc.count_lines_containing("=== Alert ==="), 1);
    assert_eq!(tc.count_lines_containing(DEFAULT_TITLE), 1);
}

#[test]
fn concurrent_submissions_are_all_counted() {
    let recorder = Arc::new(RecordingSink::new());
    let r = Arc::new(
        Reporter::builder("mt")
            .console(TestConsole::new().shared())
            .min_level(Level::Debug)
            .with_sink(recorder.clone())
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..10)
        .map(|t| {
            let r = r.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    r.log(Level::ALL[i % 5], format!("thread {t} item {i}"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snap = r.snapshot();
    assert_eq!(snap.total(), 1000);
    for (_, count) in snap.iter() {
        assert_eq!(count, 200);
    }
    assert_eq!(recorder.len(), 1000);
}

#[test]
fn reset_starts_a_new_tally() {
    let tc = TestConsole::new();
    let r = reporter(&tc, Level::Info);
    r.error("before");
    let cleared = r.reset();
    r.info("after");

    assert_eq!(cleared.get(Level::Error), 1);
    assert_eq!(r.snapshot().total(), 1);
    assert_eq!(r.snapshot().get(Level::Error), 0);
}

#[test]
fn counts_serialize_as_a_level_map() {
    let tc = TestConsole::new();
    let r = reporter(&tc, Level::Info);
    r.warning("w");

    let json = serde_json::to_value(r.snapshot()).unwrap();
    assert_eq!(json["WARNING"], 1);
    assert_eq!(json["DEBUG"], 0);
    assert_eq!(json.as_object().unwrap().len(), 5);
}
