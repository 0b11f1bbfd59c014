//! Admission, counting and fan-out.
//!
//! Every submission goes through [`EventPipeline::submit`]:
//!
//! 1. records below the floor are dropped without taking the lock;
//! 2. the per-level counter is incremented;
//! 3. one [`LogRecord`] is built and handed to every sink in attachment order.
//!
//! Steps 2 and 3 are serialized by a per-pipeline delivery mutex, so records
//! reach the sinks in the order they were counted. The counter has its own
//! mutex, held only for the increment, so a sink may read or reset the counts
//! of the pipeline that is feeding it. A failing sink is contained: the count
//! stays, later sinks still receive the record, and the failure is surfaced
//! once on the rendered sink.

use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::SinkError;
use crate::level::Level;
use crate::logging::targets;
use crate::record::{FailureContext, LogRecord, SourceLocation};
use crate::sink::{RenderedSink, Sink};
use crate::stats::{LevelCounts, StatCounter};

static NEXT_PIPELINE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Pipelines currently delivering on this thread.
    static DELIVERING: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Marks a pipeline as delivering on the current thread until dropped.
struct DeliveryGuard(u64);

impl DeliveryGuard {
    fn enter(id: u64) -> Option<Self> {
        DELIVERING.with(|active| {
            let mut active = active.borrow_mut();
            if active.contains(&id) {
                None
            } else {
                active.push(id);
                Some(Self(id))
            }
        })
    }
}

impl Drop for DeliveryGuard {
    fn drop(&mut self) {
        DELIVERING.with(|active| active.borrow_mut().retain(|&id| id != self.0));
    }
}

/// Outcome of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Below the floor: not counted, not forwarded.
    Rejected,
    /// Counted and forwarded; `failed_sinks` sinks could not take it.
    Admitted { failed_sinks: usize },
    /// Submitted by a sink of this same pipeline while it was delivering.
    /// Dropped to break the cycle.
    Suppressed,
}

/// Optional parts of a record beyond level and message.
#[derive(Debug, Clone, Default)]
pub struct RecordExtras {
    pub target: Option<String>,
    pub location: Option<SourceLocation>,
    pub failure: Option<FailureContext>,
}

/// Serialized admit, count, fan-out sequence for one reporter.
pub struct EventPipeline {
    id: u64,
    name: Arc<str>,
    min_level: Level,
    rendered: Arc<RenderedSink>,
    /// Fan-out order; the rendered sink is always first.
    sinks: Vec<Arc<dyn Sink>>,
    /// Held across increment and fan-out.
    delivery: Mutex<()>,
    counter: Mutex<StatCounter>,
    delivery_failures: AtomicU64,
}

impl EventPipeline {
    /// Build a pipeline whose first sink is `rendered`, followed by `extra`.
    #[must_use]
    pub fn new(
        name: impl Into<Arc<str>>,
        min_level: Level,
        rendered: Arc<RenderedSink>,
        extra: Vec<Arc<dyn Sink>>,
    ) -> Self {
        let mut sinks: Vec<Arc<dyn Sink>> = Vec::with_capacity(extra.len() + 1);
        sinks.push(rendered.clone());
        sinks.extend(extra);

        Self {
            id: NEXT_PIPELINE_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            min_level,
            rendered,
            sinks,
            delivery: Mutex::new(()),
            counter: Mutex::new(StatCounter::default()),
            delivery_failures: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn min_level(&self) -> Level {
        self.min_level
    }

    #[must_use]
    pub fn rendered(&self) -> &Arc<RenderedSink> {
        &self.rendered
    }

    /// Attached sink names in fan-out order.
    #[must_use]
    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|sink| sink.name()).collect()
    }

    /// Submit a plain `(level, message)` pair.
    pub fn submit(&self, level: Level, message: impl Into<String>) -> Admission {
        self.submit_with(level, message.into(), RecordExtras::default())
    }

    /// Submit with target, source location or failure context attached.
    pub fn submit_with(&self, level: Level, message: String, extras: RecordExtras) -> Admission {
        if !level.admits(self.min_level) {
            return Admission::Rejected;
        }

        let Some(_delivering) = DeliveryGuard::enter(self.id) else {
            return Admission::Suppressed;
        };

        let delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        self.lock_counter().increment(level);

        let mut record = LogRecord::new(level, message, self.name.clone())
            .with_location(extras.location)
            .with_failure(extras.failure);
        record.target = extras.target;

        let failures: Vec<(usize, SinkError)> = self
            .sinks
            .iter()
            .enumerate()
            .filter_map(|(index, sink)| deliver(sink.as_ref(), &record).err().map(|e| (index, e)))
            .collect();

        for (index, error) in &failures {
            self.surface_failure(*index, &record, error);
        }

        drop(delivery);
        Admission::Admitted {
            failed_sinks: failures.len(),
        }
    }

    /// Independent copy of the current counts.
    #[must_use]
    pub fn snapshot(&self) -> LevelCounts {
        self.lock_counter().snapshot()
    }

    /// Zero all counts, returning the counts that were cleared.
    pub fn reset(&self) -> LevelCounts {
        self.lock_counter().reset()
    }

    /// Number of contained sink failures since construction.
    #[must_use]
    pub fn delivery_failures(&self) -> u64 {
        self.delivery_failures.load(Ordering::Relaxed)
    }

    /// Flush every sink. Failures are logged and otherwise ignored.
    pub fn flush(&self) {
        for sink in &self.sinks {
            if let Err(error) = deliver_flush(sink.as_ref()) {
                log::warn!(
                    target: targets::PIPELINE,
                    "reporter '{}': sink '{}' failed to flush: {}",
                    self.name,
                    sink.name(),
                    error
                );
            }
        }
    }

    fn lock_counter(&self) -> MutexGuard<'_, StatCounter> {
        self.counter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn surface_failure(&self, index: usize, record: &LogRecord, error: &SinkError) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
        let sink = self.sinks[index].name();

        log::warn!(
            target: targets::PIPELINE,
            "reporter '{}': sink '{}' failed to deliver a {} record: {}",
            self.name,
            sink,
            record.level,
            error
        );

        // The rendered sink is index 0; never report its own failure through it.
        if index == 0 {
            return;
        }
        let notice = LogRecord::new(
            Level::Error,
            format!("sink '{sink}' failed to deliver a {} record: {error}", record.level),
            self.name.clone(),
        )
        .with_target(targets::PIPELINE);
        let _ = deliver(self.rendered.as_ref(), &notice);
    }
}

impl std::fmt::Debug for EventPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPipeline")
            .field("name", &self.name)
            .field("min_level", &self.min_level)
            .field("sinks", &self.sink_names())
            .finish_non_exhaustive()
    }
}

/// Call `accept`, turning a panic into a [`SinkError`].
fn deliver(sink: &dyn Sink, record: &LogRecord) -> Result<(), SinkError> {
    catch_unwind(AssertUnwindSafe(|| sink.accept(record)))
        .unwrap_or_else(|payload| Err(SinkError::Panicked(panic_message(payload.as_ref()))))
}

fn deliver_flush(sink: &dyn Sink) -> Result<(), SinkError> {
    catch_unwind(AssertUnwindSafe(|| sink.flush()))
        .unwrap_or_else(|payload| Err(SinkError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
