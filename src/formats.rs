//! Byte encoders for the published artifacts: CSV, XLSX and compact JSON.

use crate::error::ExportError;
use crate::nested::NestedDocument;
use crate::table::{key_text, TidyTable};
use rust_xlsxwriter::{Workbook, XlsxError};
use serde_json::{Map, Number, Value};

/// Text of a cell as written to CSV: null is the empty field.
pub fn cell_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) if n.is_f64() => float_text(n),
        other => other.to_string(),
    }
}

/// Floats in Python `repr` form: scientific below 1e-4 and from 1e16 on, with
/// a signed exponent of at least two digits (`1e+16`, `1.5e-05`).
fn float_text(n: &Number) -> String {
    let s = n.to_string();
    let (sign, body) = match s.strip_prefix('-') {
        Some(body) => ("-", body),
        None => ("", s.as_str()),
    };
    // serde_json keeps [1e-5, 1e-4) in positional form
    if let Some(digits) = body.strip_prefix("0.0000") {
        if let Some(lead) = digits.chars().next().filter(|c| *c != '0') {
            let rest = &digits[1..];
            return if rest.is_empty() { format!("{sign}{lead}e-05") } else { format!("{sign}{lead}.{rest}e-05") };
        }
    }
    let Some((mantissa, exp)) = s.split_once('e') else { return s };
    let (exp_sign, digits) = match exp.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exp.trim_start_matches('+')),
    };
    format!("{mantissa}e{exp_sign}{digits:0>2}")
}

/// Header plus one line per row, in the table's column order, `\n` terminated.
pub fn to_csv_bytes(table: &TidyTable) -> Result<Vec<u8>, ExportError> {
    let mut w = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    w.write_record(table.columns()).map_err(|e| ExportError::serialize("csv", e))?;
    for row in table.rows() {
        w.write_record(row.iter().map(cell_text)).map_err(|e| ExportError::serialize("csv", e))?;
    }
    w.into_inner().map_err(|e| ExportError::serialize("csv", e))
}

/// Single-sheet workbook with the same header and cells as the CSV.
pub fn to_xlsx_bytes(table: &TidyTable) -> Result<Vec<u8>, ExportError> {
    write_workbook(table).map_err(|e| ExportError::serialize("xlsx", e))
}

fn write_workbook(table: &TidyTable) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (c, name) in table.columns().iter().enumerate() {
        sheet.write_string(0, col_num(c)?, name.as_str())?;
    }
    for (r, row) in table.rows().iter().enumerate() {
        let r = u32::try_from(r + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (c, v) in row.iter().enumerate() {
            let c = col_num(c)?;
            match v {
                Value::Null => {}
                Value::Number(n) => {
                    sheet.write_number(r, c, n.as_f64().unwrap_or_default())?;
                }
                Value::String(s) => {
                    sheet.write_string(r, c, s.as_str())?;
                }
                Value::Bool(b) => {
                    sheet.write_boolean(r, c, *b)?;
                }
                other => {
                    sheet.write_string(r, c, other.to_string())?;
                }
            }
        }
    }
    workbook.save_to_buffer()
}

fn col_num(c: usize) -> Result<u16, XlsxError> {
    u16::try_from(c).map_err(|_| XlsxError::RowColumnLimitError)
}

/// Compact encoding of the nested document, keys in document order.
pub fn nested_to_json_bytes(doc: &NestedDocument) -> Result<Vec<u8>, ExportError> {
    serde_json::to_vec(doc).map_err(|e| ExportError::serialize("json", e))
}

/// Latest snapshot as `{identifier: {column: value, ..}, ..}`.
///
/// Rows without an identifier are dropped; the key column is not repeated
/// inside each value, and null cells are omitted.
pub fn latest_to_json_bytes(latest: &TidyTable, key_column: &str) -> Result<Vec<u8>, ExportError> {
    serde_json::to_vec(&latest_by_key(latest, key_column)?).map_err(|e| ExportError::serialize("json", e))
}

pub fn latest_by_key(latest: &TidyTable, key_column: &str) -> Result<Map<String, Value>, ExportError> {
    let key_idx = latest.require_column(key_column)?;
    let columns = latest.columns();
    let mut out = Map::with_capacity(latest.len());
    for row in latest.rows() {
        let Some(key) = key_text(&row[key_idx]) else { continue };
        let fields: Map<String, Value> = columns
            .iter()
            .zip(row)
            .enumerate()
            .filter(|&(i, (_, v))| i != key_idx && !v.is_null())
            .map(|(_, (c, v))| (c.clone(), v.clone()))
            .collect();
        out.insert(key, Value::Object(fields));
    }
    Ok(out)
}
