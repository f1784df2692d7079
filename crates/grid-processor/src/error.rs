//! Error types for grid processing.

use thiserror::Error;

/// Errors that can occur while reading windows or aggregating regions.
#[derive(Error, Debug)]
pub enum GridProcessorError {
    /// Failed to read data from the grid source.
    #[error("failed to read grid data: {0}")]
    ReadFailed(String),

    /// The requested window or time range lies outside the source.
    #[error("requested {requested} is outside grid bounds {grid}")]
    OutOfBounds { requested: String, grid: String },

    /// Invalid metadata in the grid source.
    #[error("invalid grid metadata: {0}")]
    InvalidMetadata(String),

    /// Values returned by a source do not match the requested window.
    #[error("window shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

impl GridProcessorError {
    /// Create a ReadFailed error.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    /// Create an OutOfBounds error.
    pub fn out_of_bounds(requested: impl Into<String>, grid: impl Into<String>) -> Self {
        Self::OutOfBounds {
            requested: requested.into(),
            grid: grid.into(),
        }
    }

    /// Create an InvalidMetadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }
}

/// Result type for grid processor operations.
pub type Result<T> = std::result::Result<T, GridProcessorError>;
