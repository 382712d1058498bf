//! Cell values and rows

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// A single cell in the preview table.
///
/// Cells are displayed and edited as text. Values the backend sends as JSON
/// numbers or booleans keep their kind until the user edits them, so they are
/// echoed back unchanged on export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Text, including every value typed by the user.
    Text(String),
    /// A JSON number as produced by the backend.
    Number(serde_json::Number),
    /// A JSON boolean as produced by the backend.
    Bool(bool),
}

impl CellValue {
    /// Returns the value as display text.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Number(number) => Cow::Owned(number.to_string()),
            Self::Bool(value) => Cow::Borrowed(if *value { "true" } else { "false" }),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One row of the preview table: column name to cell value.
///
/// A row may lack some columns (they read as empty text) and may carry keys
/// for columns that are not currently displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Row(BTreeMap<String, CellValue>);

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a row with every given column set to empty text.
    pub fn blank<'a>(columns: impl IntoIterator<Item = &'a String>) -> Self {
        columns
            .into_iter()
            .map(|column| (column.clone(), CellValue::default()))
            .collect()
    }

    /// Returns the stored value for a column, if any.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.0.get(column)
    }

    /// Returns the display text for a column; absent keys read as "".
    pub fn text(&self, column: &str) -> Cow<'_, str> {
        self.0
            .get(column)
            .map(CellValue::as_text)
            .unwrap_or(Cow::Borrowed(""))
    }

    /// Stores a value, replacing any previous one.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.0.insert(column.into(), value.into());
    }

    /// Returns `true` if the row holds a value for the column.
    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

// JSON nulls are dropped (an absent key already reads as empty); nested
// values are kept as their JSON text.
impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        let cells = map
            .into_iter()
            .filter_map(|(key, value)| {
                let cell = match value {
                    Value::Null => return None,
                    Value::String(text) => CellValue::Text(text),
                    Value::Number(number) => CellValue::Number(number),
                    Value::Bool(flag) => CellValue::Bool(flag),
                    nested @ (Value::Array(_) | Value::Object(_)) => {
                        CellValue::Text(nested.to_string())
                    }
                };
                Some((key, cell))
            })
            .collect();
        Self(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_from_json_keeps_scalar_kinds() {
        let row: Row =
            serde_json::from_str(r#"{"id": 1, "name": "Alice", "active": true, "note": null}"#)
                .unwrap();

        assert_eq!(row.get("id"), Some(&CellValue::from(1_i64)));
        assert_eq!(row.get("active"), Some(&CellValue::Bool(true)));
        assert_eq!(row.text("name"), "Alice");
        assert!(!row.contains("note"));
        assert_eq!(row.text("note"), "");
    }

    #[test]
    fn test_row_serializes_as_plain_object() {
        let row: Row = [("id", CellValue::from(7_i64)), ("name", CellValue::from("Bob"))]
            .into_iter()
            .collect();

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json, serde_json::json!({"id": 7, "name": "Bob"}));
    }

    #[test]
    fn test_nested_json_becomes_text() {
        let row: Row = serde_json::from_str(r#"{"tags": ["a", "b"]}"#).unwrap();
        assert_eq!(row.text("tags"), r#"["a","b"]"#);
    }

    #[test]
    fn test_blank_row_has_every_column() {
        let columns = vec!["a".to_string(), "b".to_string()];
        let row = Row::blank(&columns);

        assert_eq!(row.len(), 2);
        assert_eq!(row.get("a"), Some(&CellValue::Text(String::new())));
        assert_eq!(row.get("b"), Some(&CellValue::Text(String::new())));
    }

    #[test]
    fn test_cell_value_text() {
        assert_eq!(CellValue::from(42_i64).as_text(), "42");
        assert_eq!(CellValue::Bool(false).to_string(), "false");
        assert_eq!(CellValue::from("x"), CellValue::Text("x".to_string()));
    }
}
