//! Summary report data and rendering.
//!
//! A [`Summary`] is the data handed to the renderer: an ordered list of
//! `(level, count)` rows and a title. How it looks is decided here, not by the
//! reporter.

use crate::console::ReporterConsole;
use crate::level::Level;
use crate::render::{Cell, Column, Justify, Panel, Table};
use crate::stats::LevelCounts;

/// Visual weight given to a summary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Normal,
    /// WARNING rows
    Warning,
    /// ERROR and CRITICAL rows
    Severe,
}

impl From<Level> for Emphasis {
    fn from(level: Level) -> Self {
        match level {
            Level::Debug | Level::Info => Emphasis::Normal,
            Level::Warning => Emphasis::Warning,
            Level::Error | Level::Critical => Emphasis::Severe,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryRow {
    pub level: Level,
    pub count: u64,
}

impl SummaryRow {
    #[must_use]
    pub fn emphasis(&self) -> Emphasis {
        Emphasis::from(self.level)
    }
}

/// Titled per-level counts, always in DEBUG to CRITICAL order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub title: String,
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    #[must_use]
    pub fn new(title: impl Into<String>, counts: &LevelCounts) -> Self {
        Self {
            title: title.into(),
            rows: counts
                .iter()
                .map(|(level, count)| SummaryRow { level, count })
                .collect(),
        }
    }

    /// Render to lines: a table in a titled panel when styled, a plain
    /// listing otherwise.
    #[must_use]
    pub fn render(&self, console: &ReporterConsole) -> Vec<String> {
        if !console.is_styled() {
            return self.render_plain();
        }

        let theme = console.theme();
        let mut table = Table::new().header_style(theme.header_style.clone());
        table.add_column(
            Column::new("Level")
                .min_width(12)
                .style(theme.level_column_style.clone()),
        );
        table.add_column(Column::new("Count").justify(Justify::Right));

        for row in &self.rows {
            let style = match row.emphasis() {
                Emphasis::Normal => theme.count_style.clone(),
                Emphasis::Warning => theme.warning_emphasis.clone(),
                Emphasis::Severe => theme.error_emphasis.clone(),
            };
            table.add_row(vec![
                Cell::new(row.level.as_str()),
                Cell::styled(row.count.to_string(), style),
            ]);
        }

        Panel::new(table.render(console))
            .title(self.title.clone())
            .render(console)
    }

    fn render_plain(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(format!("=== {} ===", self.title));
        for row in &self.rows {
            let marker = match row.emphasis() {
                Emphasis::Normal => "",
                Emphasis::Warning => " (!)",
                Emphasis::Severe => " (!!)",
            };
            lines.push(format!(
                "  {:<12}{:>6}{}",
                row.level.as_str(),
                row.count,
                marker
            ));
        }
        lines
    }
}
