//! Error types for binary grid decoding.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for binary decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors raised while decoding a binary grid file.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Source file does not exist
    #[error("Source file not found: {0}")]
    MissingFile(PathBuf),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer bytes than the grid geometry requires
    #[error("Truncated grid: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// More bytes than the grid geometry allows
    #[error("Unexpected grid size: expected {expected} bytes, got {actual}")]
    UnexpectedSize { expected: usize, actual: usize },

    /// Gzip stream could not be inflated
    #[error("Decompression failed: {0}")]
    Decompression(String),

    /// Decoded values do not fit the geometry
    #[error("Invalid grid: {0}")]
    InvalidGrid(#[from] rfe_common::CommonError),
}
