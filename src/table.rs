//! The long-format input table: one row per (location, date), one column per indicator.

use crate::error::SchemaError;
use ahash::AHashSet;
use serde_json::{Number, Value};
use std::io::Read;
use std::path::Path;

pub const LOCATION: &str = "location";
pub const DATE: &str = "date";
pub const CONTINENT: &str = "continent";
pub const LAST_UPDATED_DATE: &str = "last_updated_date";

/// Column-ordered table of JSON cells. The column set is fixed and every row
/// has exactly one cell per column.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct TidyTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl TidyTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, SchemaError> {
        let mut seen = AHashSet::with_capacity(columns.len());
        for c in &columns {
            if !seen.insert(c.as_str()) {
                return Err(SchemaError::DuplicateColumn { column: c.clone() });
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(SchemaError::RaggedRow { row: i, expected: columns.len(), found: row.len() });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Build a table from JSON objects. Column order follows the first
    /// appearance of each key; keys missing from a record become null.
    pub fn from_records(records: &[Value]) -> Result<Self, SchemaError> {
        let mut columns: Vec<String> = Vec::new();
        let mut seen: AHashSet<String> = AHashSet::new();
        for (i, rec) in records.iter().enumerate() {
            let obj = rec.as_object().ok_or(SchemaError::NotAnObject { row: i })?;
            for k in obj.keys() {
                if seen.insert(k.clone()) {
                    columns.push(k.clone());
                }
            }
        }
        let rows = records
            .iter()
            .map(|rec| {
                columns
                    .iter()
                    .map(|c| rec.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Ok(Self { columns, rows })
    }

    /// Read a headed CSV. Empty fields are null; numeric text becomes a number.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, SchemaError> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(parse_cell).collect());
        }
        Self::new(columns, rows)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, SchemaError> {
        let f = std::fs::File::open(path)?;
        Self::from_csv_reader(std::io::BufReader::new(f))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, SchemaError> {
        self.column_index(name)
            .ok_or_else(|| SchemaError::MissingColumn { column: name.to_string() })
    }

    /// Cell at (`row`, `column`), if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Values of one column, in row order.
    pub fn column_values<'a>(&'a self, column: &str) -> Option<impl Iterator<Item = &'a Value> + 'a> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    pub(crate) fn with_rows(&self, rows: Vec<Vec<Value>>) -> Self {
        Self { columns: self.columns.clone(), rows }
    }

    pub(crate) fn rename_column(&mut self, from: &str, to: &str) {
        if let Some(c) = self.columns.iter_mut().find(|c| *c == from) {
            *c = to.to_string();
        }
    }
}

#[inline]
pub fn is_null(v: &Value) -> bool {
    v.is_null()
}

/// Text form of a location identifier, used as a JSON object key.
/// Null has no key.
pub fn key_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Type a raw CSV field: empty and NaN are null, integers and finite floats
/// are numbers, anything else is kept as text.
pub fn parse_cell(raw: &str) -> Value {
    let s = raw.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = s.parse::<f64>() {
        if f.is_nan() {
            return Value::Null;
        }
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}
