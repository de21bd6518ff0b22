//! Tests for output module

use super::*;
use crate::error::Error;
use crate::normalize::Table;
use serde_json::{json, Map, Value};
use std::fs;
use tempfile::tempdir;

fn sample_table() -> Table {
    let records = vec![
        json!({
            "id": 1,
            "user": {"email": "ada@example.com", "phone": "0612345678"},
            "tags": ["a", "b"],
            "active": true,
            "status": "/api/statuses/open"
        }),
        json!({"id": 2, "user": {"email": null}, "note": "ignored"}),
    ];
    Table::from_records(&records, &["user.email".to_string(), "user.phone".to_string()])
}

fn is_zip(path: &std::path::Path) -> bool {
    fs::read(path)
        .map(|bytes| bytes.starts_with(b"PK"))
        .unwrap_or(false)
}

#[test]
fn test_xlsx_sink_config_defaults() {
    let config = XlsxSinkConfig::default();
    assert_eq!(config.path(), std::path::Path::new("results/history_data.xlsx"));
    assert_eq!(config.sheet_name(), "History Data");

    let config = XlsxSinkConfig::new("out.xlsx").with_sheet_name("Export");
    assert_eq!(config.path(), std::path::Path::new("out.xlsx"));
    assert_eq!(config.sheet_name(), "Export");
}

#[test]
fn test_xlsx_sink_writes_workbook() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.xlsx");

    let mut sink = XlsxSink::new(XlsxSinkConfig::new(&path));
    sink.write(&sample_table()).unwrap();

    assert!(path.exists());
    assert!(is_zip(&path));
    assert_eq!(sink.destination(), path.display().to_string());
}

#[test]
fn test_xlsx_sink_creates_missing_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("results").join("nested").join("history_data.xlsx");

    let mut sink = XlsxSink::new(XlsxSinkConfig::new(&path));
    sink.write(&sample_table()).unwrap();

    assert!(is_zip(&path));
}

#[test]
fn test_xlsx_sink_writes_header_only_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.xlsx");

    let mut sink = XlsxSink::new(XlsxSinkConfig::new(&path));
    sink.write(&Table::default()).unwrap();

    assert!(is_zip(&path));
}

#[test]
fn test_xlsx_sink_rejects_invalid_sheet_name() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.xlsx");

    let mut sink = XlsxSink::new(XlsxSinkConfig::new(&path).with_sheet_name("bad[name]"));
    let err = sink.write(&sample_table()).unwrap_err();

    assert!(matches!(err, Error::Xlsx(_)));
    assert!(!path.exists());
}

#[test]
fn test_xlsx_sink_rejects_too_many_columns() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wide.xlsx");

    let wide: Map<String, Value> = (0..=MAX_COLUMNS)
        .map(|i| (format!("c{i}"), json!(i)))
        .collect();
    let table = Table::from_records(&[Value::Object(wide)], &[]);

    let mut sink = XlsxSink::new(XlsxSinkConfig::new(&path));
    let err = sink.write(&table).unwrap_err();

    assert!(matches!(err, Error::Output { .. }));
    assert!(err.to_string().contains("columns"));
}

#[test]
fn test_memory_sink_keeps_last_table() {
    let mut sink = MemorySink::new();
    assert!(sink.table().is_none());

    let table = sample_table();
    sink.write(&table).unwrap();

    assert_eq!(sink.writes(), 1);
    assert_eq!(sink.table(), Some(&table));
    assert_eq!(sink.destination(), "memory");
}

#[test]
fn test_xlsx_sink_truncates_oversized_cells() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("long.xlsx");

    let long = "x".repeat(MAX_CELL_CHARS + 1_000);
    let records = vec![json!({"id": 1, "email": long.clone(), "note": long})];
    let table = Table::from_records(&records, &["email".to_string()]);

    let mut sink = XlsxSink::new(XlsxSinkConfig::new(&path));
    sink.write(&table).unwrap();

    assert!(is_zip(&path));
}
