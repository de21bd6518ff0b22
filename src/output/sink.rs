//! Export sink boundary

use crate::error::Result;
use crate::normalize::Table;

/// Destination for a finished table
pub trait ExportSink {
    /// Persist the header row and every data row
    fn write(&mut self, table: &Table) -> Result<()>;

    /// Human-readable description of where the table goes
    fn destination(&self) -> String;
}

/// Sink that keeps the last table in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    table: Option<Table>,
    writes: usize,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Last table written, if any
    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    /// Number of `write` calls
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ExportSink for MemorySink {
    fn write(&mut self, table: &Table) -> Result<()> {
        self.table = Some(table.clone());
        self.writes += 1;
        Ok(())
    }

    fn destination(&self) -> String {
        "memory".to_string()
    }
}
