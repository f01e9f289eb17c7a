#[path = "common/mod.rs"]
mod common;

use common::*;
use megafile::{classify_columns, nested_to_json_bytes, to_nested_document, SchemaError};
use serde_json::json;

/// The two-row AAA example, checked byte for byte: static fields hoisted,
/// compact encoding, key order as produced by the exporter.
#[test]
fn aaa_example_is_byte_exact() {
    let t = aaa_table();
    let classes = classify_columns(t.columns(), &["population"], "location").unwrap();
    let doc = to_nested_document(&t, &classes).unwrap();
    let bytes = nested_to_json_bytes(&doc).unwrap();

    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        r#"{"AAA":{"continent":"Asia","location":"AAA","population":100,"data":[{"date":"2022-01-01","cases":5},{"date":"2022-01-02","cases":7}]}}"#
    );
}

/// Locations appear in first-appearance order, rows without an identifier
/// are dropped, and no null survives at any level.
#[test]
fn locations_in_first_appearance_order_without_nulls() {
    let t = mixed_table();
    let classes = classify_columns(t.columns(), &["population", "gdp"], "location").unwrap();
    let doc = to_nested_document(&t, &classes).unwrap();

    assert_eq!(doc.locations().collect::<Vec<_>>(), vec!["BBB", "AAA", "CCC"]);
    assert!(!contains_null(&doc.clone().into_value()));

    // CCC has null continent and population: those keys are absent, not null.
    let ccc = doc.get("CCC").unwrap();
    assert_eq!(ccc.keys().collect::<Vec<_>>(), vec!["location", "data"]);

    // BBB's second row only has its date left.
    assert_eq!(doc.entries("BBB").unwrap(), &vec![json!({"date":"2022-01-01","cases":1}), json!({"date":"2022-01-02"})]);
}

/// Every row with an identifier lands in exactly one entry of its own
/// location, in table order.
#[test]
fn every_identified_row_has_one_entry() {
    let t = mixed_table();
    let classes = classify_columns(t.columns(), &["population", "gdp"], "location").unwrap();
    let doc = to_nested_document(&t, &classes).unwrap();

    let total: usize = doc.locations().map(|l| doc.entries(l).unwrap().len()).sum();
    assert_eq!(total, 5, "six rows, one without a location");

    let aaa_dates: Vec<_> = doc.entries("AAA").unwrap().iter().map(|e| e["date"].clone()).collect();
    assert_eq!(aaa_dates, vec![json!("2022-01-01"), json!("2022-01-02")]);
    assert_eq!(doc.entries("AAA").unwrap()[0], json!({"date":"2022-01-01","cases":5,"tests":10}));
}

/// When rows of one location disagree on a static field, the first row wins.
#[test]
fn first_row_wins_for_static_fields() {
    let t = table(vec![
        json!({"location":"AAA", "date":"2022-01-01", "continent":"Asia",   "population":100, "cases":1}),
        json!({"location":"AAA", "date":"2022-01-02", "continent":"Europe", "population":200, "cases":2}),
    ]);
    let classes = classify_columns(t.columns(), &["population"], "location").unwrap();
    let doc = to_nested_document(&t, &classes).unwrap();

    let aaa = doc.get("AAA").unwrap();
    assert_eq!(aaa["population"], json!(100));
    assert_eq!(aaa["continent"], json!("Asia"));
}

/// Keyed by iso_code: the key is not repeated inside the record, and a row
/// with a null iso_code (an aggregate) is left out.
#[test]
fn iso_code_key_column() {
    let t = table(vec![
        json!({"iso_code":"ALA", "continent":"Europe", "location":"Aland", "date":"2022-01-01", "cases":1}),
        json!({"iso_code":null,  "continent":null,     "location":"World", "date":"2022-01-01", "cases":9}),
    ]);
    let classes = classify_columns(t.columns(), &[] as &[&str], "iso_code").unwrap();
    let doc = to_nested_document(&t, &classes).unwrap();

    assert_eq!(doc.len(), 1);
    assert_eq!(
        doc.into_value(),
        json!({"ALA": {"continent":"Europe","location":"Aland","data":[{"date":"2022-01-01","cases":1}]}})
    );
}

/// A kept row with a null date aborts the export.
#[test]
fn null_date_is_fatal() {
    let t = table(vec![
        json!({"location":"AAA", "date":"2022-01-01", "continent":"Asia", "cases":1}),
        json!({"location":"AAA", "date":null,         "continent":"Asia", "cases":2}),
    ]);
    let classes = classify_columns(t.columns(), &[] as &[&str], "location").unwrap();
    let err = to_nested_document(&t, &classes).unwrap_err();
    assert!(matches!(err, SchemaError::NullDate { row: 1, ref location } if location == "AAA"));
}

/// A null date on a row without a location is discarded with the row.
#[test]
fn null_date_on_unidentified_row_is_ignored() {
    let t = table(vec![
        json!({"location":"AAA", "date":"2022-01-01", "continent":"Asia", "cases":1}),
        json!({"location":null,  "date":null,         "continent":null,   "cases":2}),
    ]);
    let classes = classify_columns(t.columns(), &[] as &[&str], "location").unwrap();
    let doc = to_nested_document(&t, &classes).unwrap();
    assert_eq!(doc.len(), 1);
}
