mod config;
mod date;
mod error;
mod table;

mod classify;
mod nested;
mod snapshot;
mod formats;

mod publish;
mod pipeline;
mod concurrency;
mod progress;
mod util;

pub use crate::config::{ExportOptions, FULL_DATASET_STEM, LATEST_STEM};
pub use crate::date::{format_iso_date, parse_iso_date, today_utc, SnapshotWindow};
pub use crate::error::{ExportError, PublishError, SchemaError};
pub use crate::table::{is_null, key_text, parse_cell, TidyTable, CONTINENT, DATE, LAST_UPDATED_DATE, LOCATION};

// column classification and the two derived views of the table
pub use crate::classify::{classify_columns, ColumnClasses};
pub use crate::nested::{to_nested_document, NestedDocument, DATA_FIELD};
pub use crate::snapshot::{build_latest, SNAPSHOT_DECIMALS};

// artifact encoders
pub use crate::formats::{cell_text, latest_by_key, latest_to_json_bytes, nested_to_json_bytes, to_csv_bytes, to_xlsx_bytes};

// publish collaborator and the export entry point
pub use crate::publish::{DirPublisher, MemoryPublisher, PublishedArtifact, Publisher};
pub use crate::pipeline::{Artifact, ExportReport, MegafileExport, PublishedEntry};

pub use crate::util::{init_tracing_once, init_tracing_with_level};
