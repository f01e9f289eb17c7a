//! "Latest" snapshot: one row per location holding the most recent known
//! value of every column inside a trailing date window.

use crate::date::{parse_iso_date, SnapshotWindow};
use crate::error::SchemaError;
use crate::table::{is_null, key_text, TidyTable, DATE, LAST_UPDATED_DATE};
use ahash::AHashMap;
use serde_json::{Number, Value};
use time::Date;

/// Decimal places kept for floating point values in the snapshot.
pub const SNAPSHOT_DECIMALS: i32 = 3;

/// Build the latest snapshot of `table` for `window`.
///
/// Rows outside the window, or with a null date or identifier, are ignored.
/// The remaining rows are stably sorted by date and forward-filled per
/// location; the last filled row of each location is kept. Output rows are
/// sorted by identifier and `date` is renamed to `last_updated_date`.
pub fn build_latest(table: &TidyTable, key_column: &str, window: SnapshotWindow) -> Result<TidyTable, SchemaError> {
    let key_idx = table.require_column(key_column)?;
    let date_idx = table.require_column(DATE)?;
    let rows = table.rows();

    let mut in_window: Vec<(Date, usize)> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        if is_null(&row[key_idx]) {
            continue;
        }
        let date = match &row[date_idx] {
            Value::Null => continue,
            Value::String(s) => parse_iso_date(s)
                .ok_or_else(|| SchemaError::InvalidDate { row: i, value: s.clone() })?,
            other => return Err(SchemaError::InvalidDate { row: i, value: other.to_string() }),
        };
        if !window.contains(date) {
            continue;
        }
        in_window.push((date, i));
    }
    // stable: same-date rows keep table order
    in_window.sort_by_key(|&(date, _)| date);

    let width = table.columns().len();
    let mut filled: Vec<(String, Vec<Value>)> = Vec::new();
    let mut by_key: AHashMap<String, usize> = AHashMap::new();
    for &(_, i) in &in_window {
        let row = &rows[i];
        let Some(key) = key_text(&row[key_idx]) else { continue };
        let slot = *by_key.entry(key.clone()).or_insert_with(|| {
            filled.push((key, vec![Value::Null; width]));
            filled.len() - 1
        });
        forward_fill(&mut filled[slot].1, row);
    }

    filled.sort_by(|a, b| a.0.cmp(&b.0));
    tracing::debug!(window = %window, rows = in_window.len(), locations = filled.len(), "built latest snapshot");

    let out_rows = filled
        .into_iter()
        .map(|(_, mut row)| {
            row.iter_mut().for_each(round_in_place);
            row
        })
        .collect();
    let mut latest = table.with_rows(out_rows);
    latest.rename_column(DATE, LAST_UPDATED_DATE);
    Ok(latest)
}

/// Carry each non-null cell of `row` into `state`; null cells keep the
/// previous value.
fn forward_fill(state: &mut [Value], row: &[Value]) {
    for (slot, v) in state.iter_mut().zip(row) {
        if !is_null(v) {
            *slot = v.clone();
        }
    }
}

/// Round half to even, as pandas does.
fn round_in_place(v: &mut Value) {
    if let Value::Number(n) = v {
        if n.is_f64() {
            if let Some(f) = n.as_f64() {
                let scale = 10f64.powi(SNAPSHOT_DECIMALS);
                if let Some(r) = Number::from_f64((f * scale).round_ties_even() / scale) {
                    *n = r;
                }
            }
        }
    }
}
