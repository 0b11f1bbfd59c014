#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub mod config;
pub mod console;
pub mod detection;
pub mod error;
pub mod level;
pub mod logging; // Bridges from the `log` and `tracing` ecosystems
pub mod markup;
pub mod pipeline;
pub mod record;
pub mod render; // Table and panel layout
pub mod reporter;
pub mod sink;
pub mod stats;
pub mod summary;
pub mod testing; // Test utilities
pub mod theme;

pub use config::ReporterConfig;
pub use crate::console::ReporterConsole;
pub use detection::{DisplayContext, should_enable_rich};
pub use error::{InvalidLevelError, ReporterError, ReporterResult, SinkError};
pub use level::Level;
pub use pipeline::{Admission, EventPipeline, RecordExtras};
pub use record::{FailureContext, LogRecord, SourceLocation};
pub use reporter::{DEFAULT_TITLE, ReportGuard, Reporter, ReporterBuilder, get_reporter};
pub use sink::{PlainSink, RenderedSink, Sink};
pub use stats::LevelCounts;
pub use summary::Summary;
pub use theme::{ReporterTheme, theme};
