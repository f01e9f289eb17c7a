//! Nested-by-location document: static fields at the root of each location,
//! dated observations in an ordered `data` list, no nulls anywhere.

use crate::classify::ColumnClasses;
use crate::error::SchemaError;
use crate::table::{is_null, key_text, TidyTable, DATE, LOCATION};
use ahash::AHashMap;
use serde::Serialize;
use serde_json::{Map, Value};

pub const DATA_FIELD: &str = "data";

/// Identifier -> record, in order of first appearance in the source table.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NestedDocument {
    records: Map<String, Value>,
}

impl NestedDocument {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Map<String, Value>> {
        self.records.get(id).and_then(Value::as_object)
    }

    /// The `data` entries of one location.
    pub fn entries(&self, id: &str) -> Option<&Vec<Value>> {
        self.get(id)?.get(DATA_FIELD)?.as_array()
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.records
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.records)
    }
}

struct Group {
    first_row: usize,
    statics: Map<String, Value>,
    data: Vec<Value>,
}

/// Build the nested document.
///
/// Rows with a null identifier are skipped. Static fields are read from the
/// first row of each location only; later rows that disagree are ignored.
/// Every kept row yields exactly one entry in `data`, possibly empty.
pub fn to_nested_document(table: &TidyTable, classes: &ColumnClasses) -> Result<NestedDocument, SchemaError> {
    table.require_column(LOCATION)?;
    let key_idx = table.require_column(classes.key_column())?;
    let date_idx = table.require_column(DATE)?;
    let static_idx = resolve(table, &classes.static_columns)?;
    let entry_idx = resolve(table, classes.entry_columns())?;

    let rows = table.rows();
    let mut groups: Vec<(String, Group)> = Vec::new();
    let mut by_key: AHashMap<String, usize> = AHashMap::new();
    let mut skipped = 0usize;
    let mut disagreements = 0usize;

    for (i, row) in rows.iter().enumerate() {
        let Some(key) = key_text(&row[key_idx]) else {
            skipped += 1;
            continue;
        };
        if is_null(&row[date_idx]) {
            return Err(SchemaError::NullDate { row: i, location: key });
        }

        let slot = match by_key.get(&key) {
            Some(&slot) => {
                let first = &rows[groups[slot].1.first_row];
                if static_idx.iter().any(|&(_, c)| first[c] != row[c]) {
                    disagreements += 1;
                    tracing::debug!(location = %key, row = i, "static value differs from first row; keeping first");
                }
                slot
            }
            None => {
                let statics = non_null_fields(row, &static_idx);
                groups.push((key.clone(), Group { first_row: i, statics, data: Vec::new() }));
                by_key.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };

        groups[slot].1.data.push(Value::Object(non_null_fields(row, &entry_idx)));
    }

    if skipped > 0 {
        tracing::debug!(rows = skipped, "skipped rows without a location identifier");
    }
    if disagreements > 0 {
        tracing::warn!(rows = disagreements, "rows with static values differing from their location's first row");
    }

    let mut records = Map::with_capacity(groups.len());
    for (key, group) in groups {
        let mut record = group.statics;
        record.insert(DATA_FIELD.to_string(), Value::Array(group.data));
        records.insert(key, Value::Object(record));
    }
    Ok(NestedDocument { records })
}

fn resolve<'a>(table: &TidyTable, names: &'a [String]) -> Result<Vec<(&'a str, usize)>, SchemaError> {
    names
        .iter()
        .map(|n| table.require_column(n).map(|i| (n.as_str(), i)))
        .collect()
}

fn non_null_fields(row: &[Value], fields: &[(&str, usize)]) -> Map<String, Value> {
    fields
        .iter()
        .filter(|&&(_, i)| !is_null(&row[i]))
        .map(|&(name, i)| (name.to_string(), row[i].clone()))
        .collect()
}
