//! Display surface for rendered output

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use console::{Style, Term};

use crate::markup;
use crate::theme::ReporterTheme;

const DEFAULT_WIDTH: usize = 80;

/// A writer plus a styling decision, shared by every renderer that draws to it.
///
/// All writes go through one lock, so lines from concurrent callers never
/// interleave mid-line.
pub struct ReporterConsole {
    out: Mutex<Box<dyn Write + Send>>,
    styled: bool,
    width: Option<usize>,
    theme: &'static ReporterTheme,
}

impl ReporterConsole {
    /// Stderr console with automatic detection
    #[must_use]
    pub fn new() -> Self {
        Self::with_styling(crate::detection::should_enable_rich())
    }

    /// Stderr console with explicit styling on/off
    #[must_use]
    pub fn with_styling(styled: bool) -> Self {
        Self {
            out: Mutex::new(Box::new(io::stderr())),
            styled,
            width: None,
            theme: crate::theme::theme(),
        }
    }

    /// Console writing to a custom writer (files, buffers, tests)
    #[must_use]
    pub fn with_writer<W: Write + Send + 'static>(writer: W, styled: bool) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
            styled,
            width: Some(DEFAULT_WIDTH),
            theme: crate::theme::theme(),
        }
    }

    // ─────────────────────────────────────────────────
    // State Queries
    // ─────────────────────────────────────────────────

    /// Check if styled output is enabled
    pub fn is_styled(&self) -> bool {
        self.styled
    }

    pub fn theme(&self) -> &ReporterTheme {
        self.theme
    }

    /// Terminal width (or 80 when unknown)
    pub fn width(&self) -> usize {
        self.width.unwrap_or_else(|| {
            Term::stderr()
                .size_checked()
                .map_or(DEFAULT_WIDTH, |(_, cols)| usize::from(cols))
        })
    }

    /// Apply `style` to `text` when styling is on; otherwise return it unchanged.
    #[must_use]
    pub fn paint(&self, text: &str, style: &Style) -> String {
        if self.styled {
            style.clone().force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    // ─────────────────────────────────────────────────
    // Output Methods
    // ─────────────────────────────────────────────────

    /// Write already-rendered lines under a single lock acquisition.
    pub fn write_lines<S: AsRef<str>>(&self, lines: &[S]) -> io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        for line in lines {
            writeln!(out, "{}", line.as_ref())?;
        }
        out.flush()
    }

    /// Print markup text (tags are stripped when styling is off)
    pub fn print(&self, content: &str) {
        let _ = self.write_lines(&[markup::render(content, self.styled)]);
    }

    /// Print plain text (no markup processing ever)
    pub fn print_plain(&self, text: &str) {
        let _ = self.write_lines(&[text]);
    }

    /// Print a horizontal rule, optionally titled
    pub fn rule(&self, title: Option<&str>) {
        let width = self.width().max(8);
        let line = match title {
            Some(t) => {
                let t = markup::render(t, self.styled);
                let used = console::measure_text_width(&t) + 2;
                let left = width.saturating_sub(used) / 2;
                let right = width.saturating_sub(used + left);
                format!(
                    "{} {} {}",
                    self.paint(&"─".repeat(left), &self.theme.border_style),
                    t,
                    self.paint(&"─".repeat(right), &self.theme.border_style)
                )
            }
            None => self.paint(&"─".repeat(width), &self.theme.border_style),
        };
        let _ = self.write_lines(&[line]);
    }

    /// Print a blank line
    pub fn newline(&self) {
        let _ = self.write_lines(&[""]);
    }
}

impl Default for ReporterConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReporterConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReporterConsole")
            .field("styled", &self.styled)
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}
