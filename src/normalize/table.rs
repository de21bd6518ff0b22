//! Header derivation and row alignment

use super::flatten::{flatten, normalize_leaf, ScalarValue};
use crate::types::{FlatRecord, Record};

/// Ordered, unique column names taken from the first record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet(Vec<String>);

impl HeaderSet {
    /// Use the key order of the first flattened record
    pub fn from_first(records: &[FlatRecord]) -> Self {
        records
            .first()
            .map(|first| Self(first.keys().cloned().collect()))
            .unwrap_or_default()
    }

    /// Column names in order
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterate column names in order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no columns
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `name` is a column
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|h| h == name)
    }

    /// Cells of `record` in header order; missing keys become empty cells
    pub fn align(&self, record: &FlatRecord) -> Vec<ScalarValue> {
        self.0
            .iter()
            .map(|header| record.get(header).map(normalize_leaf).unwrap_or_default())
            .collect()
    }
}

/// Headers plus rows of cells, ready for a sink
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: HeaderSet,
    rows: Vec<Vec<ScalarValue>>,
    text_columns: Vec<String>,
}

impl Table {
    /// Flatten and align `records` under the first record's headers
    ///
    /// `text_columns` names the columns whose values should be kept as
    /// literal text by the sink; names that are not headers are ignored.
    pub fn from_records(records: &[Record], text_columns: &[String]) -> Self {
        let flat: Vec<FlatRecord> = records.iter().map(flatten).collect();
        let headers = HeaderSet::from_first(&flat);
        let rows = flat.iter().map(|record| headers.align(record)).collect();
        let text_columns = text_columns
            .iter()
            .filter(|name| headers.contains(name))
            .cloned()
            .collect();

        Self {
            headers,
            rows,
            text_columns,
        }
    }

    /// Column headers
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    /// Data rows, each aligned to the headers
    pub fn rows(&self) -> &[Vec<ScalarValue>] {
        &self.rows
    }

    /// Columns designated "preserve exact text"
    pub fn text_columns(&self) -> &[String] {
        &self.text_columns
    }

    /// Whether `header` is designated "preserve exact text"
    pub fn is_text_column(&self, header: &str) -> bool {
        self.text_columns.iter().any(|c| c == header)
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}
