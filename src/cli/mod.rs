//! CLI module
//!
//! Command-line interface for running one export.
//!
//! ```text
//! history-export [--env-file PATH] [--output PATH] [--format json|pretty] [--verbose]
//! ```

mod commands;
mod runner;

pub use commands::{Cli, OutputFormat};
pub use runner::Runner;
