//! Styled record lines on a display surface.

use std::io;
use std::sync::Arc;

use console::measure_text_width;

use super::Sink;
use crate::console::ReporterConsole;
use crate::error::SinkError;
use crate::record::LogRecord;
use crate::summary::Summary;

/// Renders records as `[12:01:02] WARNING  message  file.rs:12`.
///
/// Timestamps and source locations are optional parts of the line; the level
/// label is always shown, padded so messages line up.
#[derive(Debug, Clone)]
pub struct RenderedSink {
    console: Arc<ReporterConsole>,
    show_time: bool,
    show_path: bool,
}

const LEVEL_WIDTH: usize = 8;

impl RenderedSink {
    /// Timestamps on, source locations off.
    #[must_use]
    pub fn new(console: Arc<ReporterConsole>) -> Self {
        Self {
            console,
            show_time: true,
            show_path: false,
        }
    }

    #[must_use]
    pub fn with_timestamps(mut self, show: bool) -> Self {
        self.show_time = show;
        self
    }

    #[must_use]
    pub fn with_source_location(mut self, show: bool) -> Self {
        self.show_path = show;
        self
    }

    #[must_use]
    pub fn console(&self) -> &Arc<ReporterConsole> {
        &self.console
    }

    #[must_use]
    pub fn shows_timestamps(&self) -> bool {
        self.show_time
    }

    #[must_use]
    pub fn shows_source_location(&self) -> bool {
        self.show_path
    }

    /// Format a record into display lines.
    ///
    /// Message text is never interpreted as markup. Multi-line messages and
    /// failure details are indented under the message column.
    #[must_use]
    pub fn format_record(&self, record: &LogRecord) -> Vec<String> {
        let console = &*self.console;
        let theme = console.theme();

        let mut prefix = String::new();
        if self.show_time {
            let time = record.timestamp.format("[%H:%M:%S]").to_string();
            prefix.push_str(&console.paint(&time, &theme.dim_style));
            prefix.push(' ');
        }
        let label = format!("{:<LEVEL_WIDTH$}", record.level.as_str());
        prefix.push_str(&console.paint(&label, theme.level_style(record.level)));
        prefix.push(' ');

        let indent = " ".repeat(measure_text_width(&prefix));
        let mut message_lines = record.message.lines();
        let first = message_lines.next().unwrap_or_default();

        let mut head = format!("{prefix}{first}");
        if self.show_path {
            if let Some(location) = &record.location {
                head.push_str("  ");
                head.push_str(&console.paint(&location.to_string(), &theme.dim_style));
            }
        }

        let mut lines = vec![head];
        lines.extend(message_lines.map(|line| format!("{indent}{line}")));

        if let Some(failure) = &record.failure {
            lines.push(format!(
                "{indent}{}",
                console.paint(&format!("╰─▶ {}", failure.error), &theme.error_style)
            ));
            for cause in &failure.causes {
                lines.push(format!(
                    "{indent}    {}",
                    console.paint(&format!("caused by: {cause}"), &theme.dim_style)
                ));
            }
            if let Some(backtrace) = &failure.backtrace {
                lines.extend(
                    backtrace
                        .lines()
                        .map(|line| format!("{indent}    {}", console.paint(line, &theme.dim_style))),
                );
            }
        }

        lines
    }

    /// Draw a summary panel.
    pub fn render_summary(&self, summary: &Summary) -> io::Result<()> {
        self.console.write_lines(&summary.render(&self.console))
    }

    /// Free-form markup output; never counted, never filtered.
    pub fn display(&self, content: &str) {
        self.console.print(content);
    }
}

impl Sink for RenderedSink {
    fn name(&self) -> &str {
        "rendered"
    }

    fn accept(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.console.write_lines(&self.format_record(record))?;
        Ok(())
    }
}
