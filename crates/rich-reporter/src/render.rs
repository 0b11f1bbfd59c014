//! Table and panel layout.
//!
//! Both produce plain `Vec<String>` lines that may carry ANSI styling; widths
//! are measured on the visible text so styled and unstyled output line up
//! identically.

use console::{Alignment, Style, measure_text_width, pad_str};

use crate::console::ReporterConsole;

/// Horizontal alignment of a column's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    Left,
    Right,
    Center,
}

impl From<Justify> for Alignment {
    fn from(justify: Justify) -> Self {
        match justify {
            Justify::Left => Alignment::Left,
            Justify::Right => Alignment::Right,
            Justify::Center => Alignment::Center,
        }
    }
}

/// Table column definition
#[derive(Debug, Clone)]
pub struct Column {
    header: String,
    justify: Justify,
    min_width: usize,
    style: Option<Style>,
}

impl Column {
    #[must_use]
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            justify: Justify::Left,
            min_width: 0,
            style: None,
        }
    }

    #[must_use]
    pub fn justify(mut self, justify: Justify) -> Self {
        self.justify = justify;
        self
    }

    #[must_use]
    pub fn min_width(mut self, width: usize) -> Self {
        self.min_width = width;
        self
    }

    /// Default style for cells in this column.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }
}

/// One table cell; `style` overrides the column style.
#[derive(Debug, Clone)]
pub struct Cell {
    pub text: String,
    pub style: Option<Style>,
}

impl Cell {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    #[must_use]
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style: Some(style),
        }
    }
}

/// A simple-head table: header, underline, rows.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
    header_style: Option<Style>,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn header_style(mut self, style: Style) -> Self {
        self.header_style = Some(style);
        self
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Add a row; missing trailing cells render empty, extra cells are dropped.
    pub fn add_row(&mut self, cells: Vec<Cell>) {
        self.rows.push(cells);
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let widest_cell = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| measure_text_width(&cell.text))
                    .max()
                    .unwrap_or(0);
                col.min_width
                    .max(measure_text_width(&col.header))
                    .max(widest_cell)
            })
            .collect()
    }

    /// Render to lines.
    #[must_use]
    pub fn render(&self, console: &ReporterConsole) -> Vec<String> {
        let widths = self.widths();
        let mut lines = Vec::with_capacity(self.rows.len() + 2);

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, &width)| {
                let text = match &self.header_style {
                    Some(style) => console.paint(&col.header, style),
                    None => col.header.clone(),
                };
                pad_str(&text, width, col.justify.into(), None).into_owned()
            })
            .collect();
        lines.push(format!(" {} ", header.join("  ")));

        let underline: Vec<String> = widths.iter().map(|&w| "─".repeat(w)).collect();
        lines.push(console.paint(
            &format!(" {} ", underline.join("  ")),
            &console.theme().border_style,
        ));

        let empty = Cell::new("");
        for row in &self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (col, &width))| {
                    let cell = row.get(i).unwrap_or(&empty);
                    let text = match cell.style.as_ref().or(col.style.as_ref()) {
                        Some(style) => console.paint(&cell.text, style),
                        None => cell.text.clone(),
                    };
                    pad_str(&text, width, col.justify.into(), None).into_owned()
                })
                .collect();
            lines.push(format!(" {} ", cells.join("  ")));
        }

        lines
    }
}

/// Rounded box around body lines with a centered title in the top border.
#[derive(Debug, Clone)]
pub struct Panel {
    title: Option<String>,
    body: Vec<String>,
}

impl Panel {
    #[must_use]
    pub fn new(body: Vec<String>) -> Self {
        Self { title: None, body }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Render to lines.
    #[must_use]
    pub fn render(&self, console: &ReporterConsole) -> Vec<String> {
        let theme = console.theme();
        let border = |s: &str| console.paint(s, &theme.border_style);

        let title_width = self
            .title
            .as_deref()
            .map_or(0, |t| measure_text_width(t) + 2);
        let inner = self
            .body
            .iter()
            .map(|line| measure_text_width(line))
            .max()
            .unwrap_or(0)
            .max(title_width + 2);

        let mut lines = Vec::with_capacity(self.body.len() + 2);

        let span = inner + 2;
        let top = match &self.title {
            Some(title) => {
                let left = (span - title_width) / 2;
                let right = span - title_width - left;
                format!(
                    "{}{}{}",
                    border(&format!("╭{}", "─".repeat(left))),
                    console.paint(&format!(" {title} "), &theme.title_style),
                    border(&format!("{}╮", "─".repeat(right))),
                )
            }
            None => border(&format!("╭{}╮", "─".repeat(span))),
        };
        lines.push(top);

        for line in &self.body {
            lines.push(format!(
                "{} {} {}",
                border("│"),
                pad_str(line, inner, Alignment::Left, None),
                border("│")
            ));
        }

        lines.push(border(&format!("╰{}╯", "─".repeat(span))));
        lines
    }
}
