//! Column classification: static (per-location) vs series (per-date) columns.

use crate::error::SchemaError;
use crate::table::{CONTINENT, DATE, LOCATION};

/// Result of classifying a table's columns against a macro variable set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnClasses {
    /// `continent`, `location`, then the macro variables; deduplicated.
    pub static_columns: Vec<String>,
    /// Everything else except `location`, `date` and the key column, in table order.
    pub series_columns: Vec<String>,
    /// Columns of a per-date entry: non-static, non-key columns in table
    /// order. Same as `series_columns` plus `date` at its table position.
    entry_columns: Vec<String>,
    key_column: String,
}

impl ColumnClasses {
    pub fn is_static(&self, column: &str) -> bool {
        self.static_columns.iter().any(|c| c == column)
    }

    pub fn entry_columns(&self) -> &[String] {
        &self.entry_columns
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }
}

/// Split `columns` into static and series columns.
///
/// `continent` and `location` are always static. Every macro variable must
/// be present in `columns`, as must `location`, `date`, `continent` and
/// `key_column`; a missing one means upstream schema drift.
pub fn classify_columns<S: AsRef<str>>(
    columns: &[String],
    macro_variables: &[S],
    key_column: &str,
) -> Result<ColumnClasses, SchemaError> {
    let has = |name: &str| columns.iter().any(|c| c == name);

    for required in [LOCATION, DATE, CONTINENT, key_column] {
        if !has(required) {
            return Err(SchemaError::MissingColumn { column: required.to_string() });
        }
    }

    let mut static_columns: Vec<String> = Vec::with_capacity(macro_variables.len() + 2);
    for name in [CONTINENT, LOCATION].into_iter().chain(macro_variables.iter().map(|m| m.as_ref())) {
        if !has(name) {
            return Err(SchemaError::MissingColumn { column: name.to_string() });
        }
        if !static_columns.iter().any(|c| c == name) {
            static_columns.push(name.to_string());
        }
    }

    let mut series_columns = Vec::new();
    let mut entry_columns = Vec::new();
    for c in columns {
        if static_columns.contains(c) || c == key_column {
            continue;
        }
        entry_columns.push(c.clone());
        if c != DATE {
            series_columns.push(c.clone());
        }
    }

    Ok(ColumnClasses {
        static_columns,
        series_columns,
        entry_columns,
        key_column: key_column.to_string(),
    })
}
