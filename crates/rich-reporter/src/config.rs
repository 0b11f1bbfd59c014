//! Construction-time configuration for a reporter.
//!
//! `ReporterConfig` is a plain value: build it in code, read it from the
//! environment, or parse it from a TOML file. It is consumed by
//! [`get_reporter`](crate::reporter::get_reporter) and
//! [`ReporterBuilder::with_config`](crate::reporter::ReporterBuilder::with_config).

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::detection::DisplayContext;
use crate::error::{ReporterError, ReporterResult};
use crate::level::Level;

/// Options accepted when constructing a reporter
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReporterConfig {
    /// Admission floor
    pub min_level: Level,
    /// Show `[HH:MM:SS]` on rendered lines
    pub render_timestamps: bool,
    /// Show `file.rs:42` on rendered lines
    pub render_source_location: bool,
    /// Attach a plain-text sink writing to `persistence_path`
    pub enable_persistence: bool,
    /// Required when `enable_persistence` is set
    pub persistence_path: Option<PathBuf>,
    /// Never emit escape codes
    pub force_plain: bool,
    /// Emit escape codes even when stderr is not a terminal
    pub force_color: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            min_level: Level::Info,
            render_timestamps: true,
            render_source_location: false,
            enable_persistence: false,
            persistence_path: None,
            force_plain: false,
            force_color: false,
        }
    }
}

impl ReporterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables
    ///
    /// # Environment Variables
    ///
    /// | Variable | Values | Description |
    /// |----------|--------|-------------|
    /// | `RICH_REPORTER_LEVEL` | debug/info/warning/error/critical | Admission floor |
    /// | `RICH_REPORTER_LOG_FILE` | path | Enable persistence to this file |
    /// | `RICH_REPORTER_TIMESTAMPS` | 0/false | Hide timestamps |
    /// | `RICH_REPORTER_SHOW_PATH` | 1/true | Show source locations |
    /// | `RICH_REPORTER_PLAIN` | (set) | Force plain output |
    /// | `NO_COLOR` | (set) | Disable colors (standard) |
    /// | `RICH_REPORTER_FORCE_COLOR` | (set) | Force styled output |
    ///
    /// Unrecognized level names leave the default in place.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        // Display mode
        if var("RICH_REPORTER_FORCE_COLOR").is_some() {
            config.force_color = true;
        }
        if var("RICH_REPORTER_PLAIN").is_some() || var("NO_COLOR").is_some() {
            config.force_plain = true;
        }

        // Records
        if let Some(level) = var("RICH_REPORTER_LEVEL").and_then(|v| v.parse().ok()) {
            config.min_level = level;
        }
        if var("RICH_REPORTER_TIMESTAMPS").is_some_and(|v| is_false(&v)) {
            config.render_timestamps = false;
        }
        if var("RICH_REPORTER_SHOW_PATH").is_some_and(|v| !is_false(&v)) {
            config.render_source_location = true;
        }

        // Persistence
        if let Some(path) = var("RICH_REPORTER_LOG_FILE").filter(|p| !p.is_empty()) {
            config.enable_persistence = true;
            config.persistence_path = Some(PathBuf::from(path));
        }

        config
    }

    /// Parse a TOML document using the field names of this struct.
    ///
    /// ```toml
    /// min_level = "warning"
    /// enable_persistence = true
    /// persistence_path = "run.log"
    /// ```
    ///
    /// An unknown `min_level` name is reported as
    /// [`ReporterError::InvalidLevel`]; every other problem as
    /// [`ReporterError::Config`].
    pub fn from_toml_str(source: &str) -> ReporterResult<Self> {
        let table: toml::Table = toml::from_str(source).map_err(config_error)?;
        if let Some(toml::Value::String(level)) = table.get("min_level") {
            level.parse::<Level>()?;
        }
        toml::Value::Table(table).try_into().map_err(config_error)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ReporterResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ReporterError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    // ─────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────

    #[must_use]
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    #[must_use]
    pub fn with_timestamps(mut self, show: bool) -> Self {
        self.render_timestamps = show;
        self
    }

    #[must_use]
    pub fn with_source_location(mut self, show: bool) -> Self {
        self.render_source_location = show;
        self
    }

    /// Enable persistence to `path`
    #[must_use]
    pub fn persist_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.enable_persistence = true;
        self.persistence_path = Some(path.into());
        self
    }

    /// Toggle persistence without touching the path
    #[must_use]
    pub fn with_persistence(mut self, enable: bool) -> Self {
        self.enable_persistence = enable;
        self
    }

    #[must_use]
    pub fn plain_mode(mut self) -> Self {
        self.force_plain = true;
        self
    }

    #[must_use]
    pub fn force_color(mut self, force: bool) -> Self {
        self.force_color = force;
        self
    }

    // ─────────────────────────────────────────────────
    // Resolution Methods
    // ─────────────────────────────────────────────────

    /// Resolve the display context based on config and environment
    #[must_use]
    pub fn resolve_context(&self) -> DisplayContext {
        if self.force_plain {
            return DisplayContext::Plain;
        }
        if self.force_color {
            return DisplayContext::Styled;
        }
        DisplayContext::detect()
    }

    #[must_use]
    pub fn should_use_rich(&self) -> bool {
        self.resolve_context().is_styled()
    }
}

fn is_false(value: &str) -> bool {
    value == "0" || value.eq_ignore_ascii_case("false")
}

fn config_error(error: toml::de::Error) -> ReporterError {
    ReporterError::Config(error.to_string())
}
