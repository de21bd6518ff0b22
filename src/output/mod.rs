//! Output module
//!
//! The [`ExportSink`] boundary and its spreadsheet implementation.
//!
//! # Overview
//!
//! - [`XlsxSink`] writes one worksheet: a header row, then one row per record
//! - Columns the table designates as text get the `@` number format
//! - [`MemorySink`] keeps the table in memory for callers that post-process

mod sink;
mod xlsx;

pub use sink::{ExportSink, MemorySink};
pub use xlsx::{
    XlsxSink, XlsxSinkConfig, DEFAULT_OUTPUT_PATH, DEFAULT_SHEET_NAME, MAX_CELL_CHARS, MAX_COLUMNS,
    MAX_ROWS,
};

#[cfg(test)]
mod tests;
