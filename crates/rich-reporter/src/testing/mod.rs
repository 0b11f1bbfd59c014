//! Testing utilities for reporter output
//!
//! - [`TestConsole`] captures rendered output for assertions
//! - [`RecordingSink`] keeps every record it is handed
//! - [`FailingSink`] fails every delivery, by error or by panic

mod sinks;
mod test_console;

pub use sinks::{FailingSink, RecordingSink};
pub use test_console::TestConsole;
