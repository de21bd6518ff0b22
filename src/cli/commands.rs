//! CLI arguments

use clap::Parser;
use std::path::PathBuf;

/// Export a paginated history collection to a spreadsheet
#[derive(Parser, Debug)]
#[command(name = "history-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Env file to load instead of `./.env`
    #[arg(short, long)]
    pub env_file: Option<PathBuf>,

    /// Spreadsheet destination (overrides OUTPUT_PATH)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Run summary format
    #[arg(short, long, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run summary format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Single-line JSON
    Json,
    /// Indented JSON
    Pretty,
}
