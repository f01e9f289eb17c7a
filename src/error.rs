//! Error taxonomy for the export engine.
//!
//! `SchemaError` covers everything wrong with the input table and is raised
//! before any artifact is published. `PublishError` is raised by a sink.

use thiserror::Error;

/// The input table does not have the shape the exporter needs.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A required or declared column is not in the table.
    #[error("column '{column}' not found in table")]
    MissingColumn { column: String },

    /// The header names the same column twice.
    #[error("column '{column}' appears more than once")]
    DuplicateColumn { column: String },

    /// A row has a different number of cells than the header.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    /// A row with a location has no date.
    #[error("row {row} (location '{location}') has a null date")]
    NullDate { row: usize, location: String },

    /// A date cell is not an ISO-8601 calendar date.
    #[error("row {row} has invalid date '{value}'")]
    InvalidDate { row: usize, value: String },

    /// A JSON record used to build a table is not an object.
    #[error("record {row} is not a JSON object")]
    NotAnObject { row: usize },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A publish sink failed to store an artifact.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to publish {destination}: {source}")]
    Io {
        destination: String,
        #[source]
        source: std::io::Error,
    },

    #[error("publish of {destination} rejected: {reason}")]
    Rejected { destination: String, reason: String },
}

impl PublishError {
    pub fn destination(&self) -> &str {
        match self {
            PublishError::Io { destination, .. } => destination,
            PublishError::Rejected { destination, .. } => destination,
        }
    }
}

/// Any failure of an export run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    /// An artifact could not be encoded.
    #[error("failed to serialize {artifact}: {message}")]
    Serialize { artifact: String, message: String },
}

impl ExportError {
    pub(crate) fn serialize(artifact: &str, err: impl std::fmt::Display) -> Self {
        ExportError::Serialize { artifact: artifact.to_string(), message: err.to_string() }
    }
}
