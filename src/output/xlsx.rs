//! Spreadsheet writer
//!
//! Writes a [`Table`] to a single-sheet `.xlsx` workbook.

use super::sink::ExportSink;
use crate::error::{Error, Result};
use crate::normalize::{ScalarValue, Table};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default output file, relative to the working directory
pub const DEFAULT_OUTPUT_PATH: &str = "results/history_data.xlsx";

/// Default worksheet name
pub const DEFAULT_SHEET_NAME: &str = "History Data";

/// Rows per worksheet, header included
pub const MAX_ROWS: usize = 1_048_576;

/// Columns per worksheet
pub const MAX_COLUMNS: usize = 16_384;

/// Characters a single cell can hold
pub const MAX_CELL_CHARS: usize = 32_767;

/// Number format that makes the spreadsheet keep cell text verbatim
const TEXT_NUM_FORMAT: &str = "@";

/// Configuration for the xlsx sink
#[derive(Debug, Clone)]
pub struct XlsxSinkConfig {
    path: PathBuf,
    sheet_name: String,
}

impl Default for XlsxSinkConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

impl XlsxSinkConfig {
    /// Create a config writing to `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set worksheet name
    #[must_use]
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Output path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Worksheet name
    #[must_use]
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }
}

/// Sink writing one workbook per call
#[derive(Debug, Clone, Default)]
pub struct XlsxSink {
    config: XlsxSinkConfig,
}

impl XlsxSink {
    /// Create a sink
    pub fn new(config: XlsxSinkConfig) -> Self {
        Self { config }
    }

    fn check_limits(table: &Table) -> Result<()> {
        if table.row_count() + 1 > MAX_ROWS {
            return Err(Error::output(format!(
                "{} rows do not fit in one worksheet (max {})",
                table.row_count(),
                MAX_ROWS - 1
            )));
        }
        if table.column_count() > MAX_COLUMNS {
            return Err(Error::output(format!(
                "{} columns do not fit in one worksheet (max {MAX_COLUMNS})",
                table.column_count()
            )));
        }
        Ok(())
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    Error::output(format!(
                        "Failed to create directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        Ok(())
    }
}

impl ExportSink for XlsxSink {
    fn write(&mut self, table: &Table) -> Result<()> {
        Self::check_limits(table)?;
        self.ensure_parent_dir()?;

        let text_format = Format::new().set_num_format(TEXT_NUM_FORMAT);
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(self.config.sheet_name.as_str())?;

        let text_columns: Vec<bool> = table
            .headers()
            .iter()
            .map(|h| table.is_text_column(h))
            .collect();

        for (col, header) in table.headers().iter().enumerate() {
            let col = col as u16;
            if text_columns[col as usize] {
                worksheet.set_column_format(col, &text_format)?;
            }
            worksheet.write_string(0, col, fit_cell_text(header, 0, col))?;
        }

        for (idx, row) in table.rows().iter().enumerate() {
            let row_num = idx as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                let as_text = text_columns.get(col).copied().unwrap_or(false);
                write_cell(worksheet, row_num, col as u16, cell, as_text.then_some(&text_format))?;
            }
        }

        workbook.save(&self.config.path)?;
        debug!(
            path = %self.config.path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "Workbook saved"
        );
        Ok(())
    }

    fn destination(&self) -> String {
        self.config.path.display().to_string()
    }
}

/// Write one cell; a text format forces the value to be stored as text
fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &ScalarValue,
    text_format: Option<&Format>,
) -> Result<()> {
    if cell.is_empty() {
        if let Some(format) = text_format {
            worksheet.write_blank(row, col, format)?;
        }
        return Ok(());
    }

    match (cell, text_format) {
        (_, Some(format)) => {
            let text = cell.to_string();
            worksheet.write_string_with_format(
                row,
                col,
                fit_cell_text(&text, row, col),
                format,
            )?;
        }
        (ScalarValue::Text(s), None) => {
            worksheet.write_string(row, col, fit_cell_text(s, row, col))?;
        }
        (ScalarValue::Number(n), None) => match n.as_f64() {
            Some(f) => {
                worksheet.write_number(row, col, f)?;
            }
            None => {
                worksheet.write_string(row, col, n.to_string())?;
            }
        },
        (ScalarValue::Bool(b), None) => {
            worksheet.write_boolean(row, col, *b)?;
        }
    }
    Ok(())
}

/// Cut text down to what one cell can hold
///
/// An oversized value loses its tail rather than failing the workbook.
fn fit_cell_text(text: &str, row: u32, col: u16) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => {
            warn!(
                row,
                col,
                chars = text.chars().count(),
                max = MAX_CELL_CHARS,
                "Cell text too long, truncating"
            );
            Cow::Owned(text[..cut].to_string())
        }
        None => Cow::Borrowed(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_cell_text() {
        assert_eq!(fit_cell_text("short", 1, 0), "short");

        let exact = "a".repeat(MAX_CELL_CHARS);
        assert!(matches!(fit_cell_text(&exact, 1, 0), Cow::Borrowed(_)));

        let long = "é".repeat(MAX_CELL_CHARS + 10);
        let cut = fit_cell_text(&long, 1, 0);
        assert_eq!(cut.chars().count(), MAX_CELL_CHARS);
        assert!(long.starts_with(cut.as_ref()));
    }
}
