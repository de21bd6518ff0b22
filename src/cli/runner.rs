//! CLI runner - executes one export

use crate::cli::commands::{Cli, OutputFormat};
use crate::config::AppConfig;
use crate::engine::{ExportEngine, RunSummary};
use crate::error::Result;
use crate::output::{XlsxSink, XlsxSinkConfig};
use serde::Serialize;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Load config, run the export and print the summary
    pub async fn run(&self) -> Result<RunSummary> {
        let config = self.load_config()?;
        let engine = ExportEngine::new(&config)?;
        let mut sink = XlsxSink::new(XlsxSinkConfig::new(&engine.config().output_path));

        let summary = engine.run(&mut sink).await?;
        info!(
            records = summary.records,
            pages = summary.pages,
            partial = summary.is_partial(),
            elapsed_ms = summary.elapsed().as_millis() as u64,
            "Export finished"
        );
        self.output_message(&summary);
        Ok(summary)
    }

    /// Read the config from the environment and apply CLI overrides
    pub fn load_config(&self) -> Result<AppConfig> {
        let config = match &self.cli.env_file {
            Some(path) => AppConfig::from_env_file(path)?,
            None => AppConfig::from_env()?,
        };

        Ok(match &self.cli.output {
            Some(path) => config.with_output_path(path),
            None => config,
        })
    }

    /// Output a message
    fn output_message<T: Serialize>(&self, msg: &T) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
