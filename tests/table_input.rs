#[path = "common/mod.rs"]
mod common;

use common::*;
use megafile::{cell_text, parse_cell, to_csv_bytes, SchemaError, TidyTable};
use serde_json::{json, Value};

/// CSV cells are typed: empty is null, integers and floats are numbers,
/// dates and names stay text.
#[test]
fn csv_cells_are_typed() {
    let data = "location,date,continent,population,rate\n\
                AAA,2022-01-01,Asia,100,0.5\n\
                AAA,2022-01-02,,100,\n";
    let t = TidyTable::from_csv_reader(data.as_bytes()).unwrap();

    assert_eq!(t.columns(), ["location", "date", "continent", "population", "rate"]);
    assert_eq!(t.rows()[0], vec![json!("AAA"), json!("2022-01-01"), json!("Asia"), json!(100), json!(0.5)]);
    assert_eq!(t.rows()[1][2], Value::Null);
    assert_eq!(t.rows()[1][4], Value::Null);
}

#[test]
fn parse_cell_edge_cases() {
    assert_eq!(parse_cell("  "), Value::Null);
    assert_eq!(parse_cell("NaN"), Value::Null);
    assert_eq!(parse_cell("-3"), json!(-3));
    assert_eq!(parse_cell("1e3"), json!(1000.0));
    assert_eq!(parse_cell("OWID_WRL"), json!("OWID_WRL"));
    assert_eq!(parse_cell("inf"), json!("inf"));
}

/// Floats render the way pandas writes them: signed two-digit exponents,
/// scientific notation below 1e-4 and from 1e16 on.
#[test]
fn float_cells_render_like_pandas() {
    assert_eq!(cell_text(&json!(1e16)), "1e+16");
    assert_eq!(cell_text(&json!(-2.5e20)), "-2.5e+20");
    assert_eq!(cell_text(&json!(1.5e-7)), "1.5e-07");
    assert_eq!(cell_text(&json!(1.5e-5)), "1.5e-05");
    assert_eq!(cell_text(&json!(0.0001)), "0.0001");
    assert_eq!(cell_text(&json!(1e15)), "1000000000000000.0");
    assert_eq!(cell_text(&json!(2.5)), "2.5");
    assert_eq!(cell_text(&json!(7)), "7");
}

/// Loading the full-table CSV and writing it back gives the same bytes.
#[test]
fn csv_load_and_write_back() {
    let data = "location,date,continent,population,rate\nAAA,2022-01-01,Asia,100,0.5\nBBB,2022-01-02,,7,\n";
    let t = TidyTable::from_csv_reader(data.as_bytes()).unwrap();
    assert_eq!(String::from_utf8(to_csv_bytes(&t).unwrap()).unwrap(), data);
}

#[test]
fn duplicate_header_is_rejected() {
    let err = TidyTable::from_csv_reader("location,date,date\nAAA,2022-01-01,2022-01-01\n".as_bytes()).unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateColumn { ref column } if column == "date"));
}

#[test]
fn ragged_rows_are_rejected() {
    let err = TidyTable::new(
        vec!["location".into(), "date".into()],
        vec![vec![json!("AAA"), json!("2022-01-01")], vec![json!("AAA")]],
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::RaggedRow { row: 1, expected: 2, found: 1 }));

    let err = TidyTable::from_csv_reader("location,date\nAAA\n".as_bytes()).unwrap_err();
    assert!(matches!(err, SchemaError::Csv(_)));
}

/// Records with different key sets share one column list; absent keys are null.
#[test]
fn records_with_uneven_keys() {
    let t = table(vec![
        json!({"location":"AAA", "date":"2022-01-01", "cases":1}),
        json!({"location":"AAA", "date":"2022-01-02", "tests":5}),
    ]);
    assert_eq!(t.columns(), ["location", "date", "cases", "tests"]);
    assert_eq!(t.get(0, "tests"), Some(&Value::Null));
    assert_eq!(t.get(1, "cases"), Some(&Value::Null));

    assert!(matches!(TidyTable::from_records(&[json!([1, 2])]), Err(SchemaError::NotAnObject { row: 0 })));
}
