//! Error types for local storage.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised while walking or preparing the data directory.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Directory expected to hold source files does not exist
    #[error("Directory not found: {0}")]
    MissingDirectory(PathBuf),

    /// Directory walk failed part way
    #[error("Failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
