#![allow(dead_code)]

use megafile::{parse_iso_date, PublishError, Publisher, TidyTable};
use parking_lot::Mutex;
use serde_json::{json, Value};
use time::{Date, Duration};

/// Parse a "YYYY-MM-DD" literal.
pub fn d(s: &str) -> Date {
    parse_iso_date(s).unwrap()
}

/// `reference` shifted back by `days`, formatted as an ISO date string.
pub fn days_before(reference: Date, days: i64) -> String {
    megafile::format_iso_date(reference - Duration::days(days))
}

pub fn table(records: Vec<Value>) -> TidyTable {
    TidyTable::from_records(&records).unwrap()
}

/// Two rows for one location; static set `{population}`.
pub fn aaa_table() -> TidyTable {
    table(vec![
        json!({"location":"AAA", "date":"2022-01-01", "continent":"Asia", "population":100, "cases":5}),
        json!({"location":"AAA", "date":"2022-01-02", "continent":"Asia", "population":100, "cases":7}),
    ])
}

/// Three locations (BBB first in the table), nulls sprinkled through series
/// and static columns, and one row with no location identifier.
pub fn mixed_table() -> TidyTable {
    table(vec![
        json!({"location":"BBB", "date":"2022-01-01", "continent":"Europe", "population":50,   "gdp":null, "cases":1,    "tests":null}),
        json!({"location":"AAA", "date":"2022-01-01", "continent":"Asia",   "population":100,  "gdp":2.5,  "cases":5,    "tests":10}),
        json!({"location":"BBB", "date":"2022-01-02", "continent":"Europe", "population":50,   "gdp":null, "cases":null, "tests":null}),
        json!({"location":null,  "date":"2022-01-02", "continent":null,     "population":9000, "gdp":null, "cases":99,   "tests":null}),
        json!({"location":"AAA", "date":"2022-01-02", "continent":"Asia",   "population":100,  "gdp":2.5,  "cases":7,    "tests":null}),
        json!({"location":"CCC", "date":"2022-01-01", "continent":null,     "population":null, "gdp":null, "cases":3,    "tests":4}),
    ])
}

pub fn json_of(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

/// True if `v` or anything nested inside it is JSON null.
pub fn contains_null(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Array(items) => items.iter().any(contains_null),
        Value::Object(map) => map.values().any(contains_null),
        _ => false,
    }
}

/// Publisher that records every call and rejects one destination.
pub struct FailingPublisher {
    pub fail_on: String,
    pub calls: Mutex<Vec<String>>,
}

impl FailingPublisher {
    pub fn new(fail_on: &str) -> Self {
        Self { fail_on: fail_on.to_string(), calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl Publisher for FailingPublisher {
    fn publish(&self, _content: &[u8], destination: &str, _public: bool) -> Result<(), PublishError> {
        self.calls.lock().push(destination.to_string());
        if destination == self.fail_on {
            return Err(PublishError::Rejected {
                destination: destination.to_string(),
                reason: "bucket unavailable".to_string(),
            });
        }
        Ok(())
    }
}
