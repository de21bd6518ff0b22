//! Engine types
//!
//! Summary of a finished export run.

use crate::pagination::HaltReason;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// What one run did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
    /// Records retrieved
    pub records: usize,
    /// Non-empty pages retrieved
    pub pages: u32,
    /// Why paging stopped
    pub halt: HaltReason,
    /// Columns in the written table
    pub columns: usize,
    /// Where the table went; `None` when nothing was written
    pub output: Option<String>,
}

impl RunSummary {
    /// Wall-clock duration of the run
    pub fn elapsed(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    /// Whether records may be missing
    pub fn is_partial(&self) -> bool {
        self.halt.is_partial()
    }

    /// Whether the sink received a table
    pub fn wrote_output(&self) -> bool {
        self.output.is_some()
    }
}
