//! Command-line interface.

pub mod output;
pub mod types;

pub use output::{format_report, log_fatal};
pub use types::{Cli, LogFormatArg};
