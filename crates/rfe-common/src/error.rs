//! Error types shared by the rainfall-estimate crates.

use thiserror::Error;

/// Result type alias using CommonError.
pub type CommonResult<T> = Result<T, CommonError>;

/// Errors raised while parsing dates, filenames and product names.
#[derive(Debug, Error)]
pub enum CommonError {
    #[error("Invalid date '{value}': expected {expected}")]
    InvalidDate { value: String, expected: &'static str },

    #[error("Filename '{name}' does not match pattern '{pattern}'")]
    FilenameMismatch { name: String, pattern: String },

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Invalid date range: start {start} is not before end {end}")]
    InvalidRange { start: String, end: String },

    #[error("Grid shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}
