pub mod batch;
pub mod config;
pub mod format;
pub mod parser;

pub use format::{run_formatter, FormatError, FormatOptions, FormatOutcome, IndentStyle};
