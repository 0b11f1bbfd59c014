//! TestConsole for capturing output in tests
//!
//! Provides a console that captures all output for assertion instead of
//! writing to stderr.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use strip_ansi_escapes::strip;

use crate::console::ReporterConsole;

/// A console that captures output for testing
///
/// Hand `shared()` to a reporter or renderer, then use `output()`,
/// `contains()` and the assertion methods to verify what was drawn.
/// ANSI codes are stripped when reading through `output()`; `raw_output()`
/// keeps them.
#[derive(Clone)]
pub struct TestConsole {
    inner: Arc<ReporterConsole>,
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl TestConsole {
    /// Capture unstyled output
    #[must_use]
    pub fn new() -> Self {
        Self::with_styling(false)
    }

    /// Capture styled output (for checking escape codes are emitted)
    #[must_use]
    pub fn new_styled() -> Self {
        Self::with_styling(true)
    }

    fn with_styling(styled: bool) -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        Self {
            inner: Arc::new(ReporterConsole::with_writer(
                BufferWriter(buffer.clone()),
                styled,
            )),
            buffer,
        }
    }

    /// The underlying console, for direct rendering
    #[must_use]
    pub fn console(&self) -> &ReporterConsole {
        &self.inner
    }

    /// A shared handle, for `ReporterBuilder::console`
    #[must_use]
    pub fn shared(&self) -> Arc<ReporterConsole> {
        self.inner.clone()
    }

    fn bytes(&self) -> Vec<u8> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Captured lines, ANSI codes stripped
    #[must_use]
    pub fn output(&self) -> Vec<String> {
        let stripped = strip(self.bytes());
        String::from_utf8_lossy(&stripped)
            .lines()
            .map(String::from)
            .collect()
    }

    /// Captured lines with ANSI codes
    #[must_use]
    pub fn raw_output(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.bytes())
            .lines()
            .map(String::from)
            .collect()
    }

    #[must_use]
    pub fn output_string(&self) -> String {
        self.output().join("\n")
    }

    /// Case-insensitive substring check
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.output_string()
            .to_lowercase()
            .contains(&needle.to_lowercase())
    }

    #[must_use]
    pub fn contains_all(&self, needles: &[&str]) -> bool {
        needles.iter().all(|n| self.contains(n))
    }

    /// Check if output matches a regex pattern (invalid patterns never match)
    #[must_use]
    pub fn matches(&self, pattern: &str) -> bool {
        regex::Regex::new(pattern).is_ok_and(|re| re.is_match(&self.output_string()))
    }

    /// Number of captured lines containing `needle` (case-sensitive)
    #[must_use]
    pub fn count_lines_containing(&self, needle: &str) -> usize {
        self.output().iter().filter(|l| l.contains(needle)).count()
    }

    /// # Panics
    ///
    /// Panics if the output does not contain `needle`.
    pub fn assert_contains(&self, needle: &str) {
        assert!(
            self.contains(needle),
            "Output did not contain '{}'. Actual output:\n{}",
            needle,
            self.output_string()
        );
    }

    /// # Panics
    ///
    /// Panics if the output contains `needle`.
    pub fn assert_not_contains(&self, needle: &str) {
        assert!(
            !self.contains(needle),
            "Output unexpectedly contained '{}'. Actual output:\n{}",
            needle,
            self.output_string()
        );
    }

    /// # Panics
    ///
    /// Panics if the line count doesn't match `expected`.
    pub fn assert_line_count(&self, expected: usize) {
        let actual = self.output().len();
        assert_eq!(
            actual,
            expected,
            "Expected {} lines but got {}. Actual output:\n{}",
            expected,
            actual,
            self.output_string()
        );
    }

    pub fn clear(&self) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    #[must_use]
    pub fn is_styled(&self) -> bool {
        self.inner.is_styled()
    }
}

impl Default for TestConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TestConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestConsole")
            .field("is_styled", &self.is_styled())
            .field("line_count", &self.output().len())
            .finish()
    }
}

/// Writer that captures to a buffer
struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
