//! Error types for extraction.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop an extraction run.
///
/// Per-file decode failures are not errors at this level: they become
/// missing values in the table.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Region table {path} not readable: {source}")]
    RegionTable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Region table is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Region table row {row}: column {column} has non-numeric value '{value}'")]
    InvalidBound {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Region table has no rows")]
    NoRegions,

    #[error("Failed to list source files: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Cannot read grid {path}: {message}")]
    SourceUnreadable { path: PathBuf, message: String },

    #[error("Failed to write output {path}: {message}")]
    OutputWrite { path: PathBuf, message: String },
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
