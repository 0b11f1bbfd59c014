//! Styled/plain output detection
//!
//! Decides whether rendered output gets ANSI styling, based on the
//! environment and on whether stderr is attached to a terminal.

use console::Term;

/// Display context for rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayContext {
    /// Plain text, no escape codes (pipes, CI, log collectors)
    Plain,
    /// Styled terminal output
    #[default]
    Styled,
}

impl DisplayContext {
    /// Auto-detect the display context from environment
    #[must_use]
    pub fn detect() -> Self {
        if should_enable_rich() {
            Self::Styled
        } else {
            Self::Plain
        }
    }

    #[must_use]
    pub fn is_styled(&self) -> bool {
        matches!(self, Self::Styled)
    }

    #[must_use]
    pub fn is_plain(&self) -> bool {
        matches!(self, Self::Plain)
    }
}

/// Whether the environment asks for plain output
#[must_use]
pub fn plain_requested() -> bool {
    std::env::var_os("RICH_REPORTER_PLAIN").is_some() || std::env::var_os("NO_COLOR").is_some()
}

/// Determine if styled output should be enabled
#[must_use]
pub fn should_enable_rich() -> bool {
    // Explicit enable always wins
    if std::env::var_os("RICH_REPORTER_FORCE_COLOR").is_some() {
        return true;
    }

    if plain_requested() {
        return false;
    }

    Term::stderr().is_term()
}
