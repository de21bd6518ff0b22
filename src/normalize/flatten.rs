//! Record flattening and value sanitization

use crate::types::{FlatRecord, JsonObject, JsonValue};
use serde_json::{Number, Value};

/// Separator between parent and child keys
pub const KEY_SEPARATOR: char = '.';

/// Separator between list elements once joined
pub const LIST_SEPARATOR: &str = ", ";

/// Column used when a record is not a map
pub const SCALAR_RECORD_KEY: &str = "value";

/// A cell value the spreadsheet can take as-is
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Text, possibly empty
    Text(String),
    /// A JSON number, kept exact until written
    Number(Number),
    /// A boolean
    Bool(bool),
}

impl ScalarValue {
    /// The empty cell
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Whether this is the empty cell
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }
}

impl Default for ScalarValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<ScalarValue> for Value {
    fn from(value: ScalarValue) -> Self {
        match value {
            ScalarValue::Text(s) => Value::String(s),
            ScalarValue::Number(n) => Value::Number(n),
            ScalarValue::Bool(b) => Value::Bool(b),
        }
    }
}

/// Flatten nested maps into dotted keys
///
/// Lists and scalars are leaves. An empty nested map contributes no keys.
/// Key order follows the record.
pub fn flatten(record: &JsonValue) -> FlatRecord {
    let mut flat = FlatRecord::new();
    match record {
        Value::Object(map) => flatten_into(map, None, &mut flat),
        other => {
            flat.insert(SCALAR_RECORD_KEY.to_string(), other.clone());
        }
    }
    flat
}

fn flatten_into(map: &JsonObject, prefix: Option<&str>, out: &mut FlatRecord) {
    for (key, value) in map {
        let path = match prefix {
            Some(parent) => format!("{parent}{KEY_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(child) => flatten_into(child, Some(&path), out),
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}

/// Keep only what follows the last `/`
///
/// Turns resource references such as `/api/users/42` into `42`.
pub fn collapse_reference(value: &str) -> &str {
    match value.rfind('/') {
        Some(idx) => &value[idx + 1..],
        None => value,
    }
}

/// Coerce any JSON value into a cell value
///
/// Null becomes the empty cell, lists are joined with `", "`, and a map
/// (only reachable when called directly) becomes compact JSON text.
pub fn sanitize_value(value: &JsonValue) -> ScalarValue {
    match value {
        Value::Null => ScalarValue::empty(),
        Value::Bool(b) => ScalarValue::Bool(*b),
        Value::Number(n) => ScalarValue::Number(n.clone()),
        Value::String(s) => ScalarValue::Text(s.clone()),
        Value::Array(items) => ScalarValue::Text(
            items
                .iter()
                .map(element_text)
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
        ),
        Value::Object(_) => ScalarValue::Text(value.to_string()),
    }
}

/// Collapse references in string leaves, then sanitize
pub fn normalize_leaf(value: &JsonValue) -> ScalarValue {
    match value {
        Value::String(s) => ScalarValue::Text(collapse_reference(s).to_string()),
        other => sanitize_value(other),
    }
}

fn element_text(value: &JsonValue) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
