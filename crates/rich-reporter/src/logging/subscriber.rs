//! Tracing subscriber integration.
//!
//! Provides a tracing `Layer` and builder that route events into a
//! [`Reporter`], so `tracing::warn!` is counted like `reporter.warning`.

use std::fmt;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

use super::targets;
use crate::level::Level;
use crate::record::SourceLocation;
use crate::reporter::Reporter;

/// A tracing layer that forwards events to a [`Reporter`].
///
/// The event's `message` becomes the record message; other fields follow it
/// as `key=value`, then the span path as `span=outer::inner`.
pub struct ReporterLayer {
    reporter: Arc<Reporter>,
}

impl ReporterLayer {
    #[must_use]
    pub fn new(reporter: Arc<Reporter>) -> Self {
        Self { reporter }
    }
}

impl fmt::Debug for ReporterLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReporterLayer")
            .field("reporter", &self.reporter.name())
            .finish()
    }
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl FieldCollector {
    fn record_value(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            if self.message.is_none() {
                self.message = Some(value);
            }
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }

    fn into_message(self, fallback: &str) -> String {
        let mut message = self.message.unwrap_or_else(|| fallback.to_string());
        for (key, value) in self.fields {
            message.push(' ');
            message.push_str(&key);
            message.push('=');
            message.push_str(&value);
        }
        message
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, value.to_string());
    }
}

impl<S> Layer<S> for ReporterLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if targets::is_internal(metadata.target()) {
            return;
        }

        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        if let Some(scope) = ctx.event_scope(event) {
            let spans: Vec<&str> = scope.from_root().map(|span| span.name()).collect();
            if !spans.is_empty() {
                collector
                    .fields
                    .push(("span".to_string(), spans.join("::")));
            }
        }

        let location = match (metadata.file(), metadata.line()) {
            (Some(file), Some(line)) => Some(SourceLocation::new(file, line)),
            _ => None,
        };

        self.reporter.forward(
            Level::from(*metadata.level()),
            collector.into_message(metadata.name()),
            metadata.target(),
            location,
        );
    }
}

/// Builder for a registry with a [`ReporterLayer`] on top.
#[derive(Debug)]
pub struct ReporterSubscriberBuilder {
    reporter: Arc<Reporter>,
    level_filter: LevelFilter,
}

impl ReporterSubscriberBuilder {
    /// Filter defaults to the reporter's floor; a DEBUG floor also admits
    /// TRACE, which is counted as DEBUG.
    #[must_use]
    pub fn new(reporter: Arc<Reporter>) -> Self {
        let level_filter = match reporter.min_level() {
            Level::Debug => LevelFilter::TRACE,
            Level::Info => LevelFilter::INFO,
            Level::Warning => LevelFilter::WARN,
            Level::Error | Level::Critical => LevelFilter::ERROR,
        };
        Self {
            reporter,
            level_filter,
        }
    }

    /// Set the minimum level passed to the layer.
    #[must_use]
    pub fn with_level_filter(mut self, filter: LevelFilter) -> Self {
        self.level_filter = filter;
        self
    }

    /// Build the subscriber without installing it.
    #[must_use]
    pub fn build(self) -> impl Subscriber + Send + Sync {
        tracing_subscriber::registry()
            .with(self.level_filter)
            .with(ReporterLayer::new(self.reporter))
    }

    /// Build and install as the global subscriber.
    pub fn init(self) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
        tracing::subscriber::set_global_default(self.build())
    }
}
