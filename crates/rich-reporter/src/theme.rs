//! Colors and styles used by the rendered sink and the summary panel.

use std::sync::OnceLock;

use console::Style;

use crate::level::Level;

/// Style set shared by every renderer.
#[derive(Debug, Clone)]
pub struct ReporterTheme {
    pub debug_style: Style,
    pub info_style: Style,
    pub warning_style: Style,
    pub error_style: Style,
    pub critical_style: Style,

    /// Timestamps and source locations.
    pub dim_style: Style,

    // Summary panel
    pub header_style: Style,
    pub level_column_style: Style,
    pub count_style: Style,
    /// Count emphasis for WARNING rows.
    pub warning_emphasis: Style,
    /// Count emphasis for ERROR and CRITICAL rows.
    pub error_emphasis: Style,
    pub border_style: Style,
    pub title_style: Style,
}

impl ReporterTheme {
    /// Label style for a level in log lines.
    #[must_use]
    pub fn level_style(&self, level: Level) -> &Style {
        match level {
            Level::Debug => &self.debug_style,
            Level::Info => &self.info_style,
            Level::Warning => &self.warning_style,
            Level::Error => &self.error_style,
            Level::Critical => &self.critical_style,
        }
    }
}

impl Default for ReporterTheme {
    fn default() -> Self {
        Self {
            debug_style: Style::new().green(),
            info_style: Style::new().blue(),
            warning_style: Style::new().red(),
            error_style: Style::new().red().bold(),
            critical_style: Style::new().red().bold().reverse(),
            dim_style: Style::new().dim(),
            header_style: Style::new().magenta().bold(),
            level_column_style: Style::new().cyan(),
            count_style: Style::new().green(),
            warning_emphasis: Style::new().yellow().bold(),
            error_emphasis: Style::new().red().bold(),
            border_style: Style::new().blue(),
            title_style: Style::new().blue().bold(),
        }
    }
}

static THEME: OnceLock<ReporterTheme> = OnceLock::new();

/// The process-wide default theme.
#[must_use]
pub fn theme() -> &'static ReporterTheme {
    THEME.get_or_init(ReporterTheme::default)
}
