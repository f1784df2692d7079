//! Error types for the ingestion crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while converting binary grids.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Failed to decode binary grid: {0}")]
    Decode(#[from] binary_parser::DecodeError),

    #[error("Failed to write netCDF: {0}")]
    Encode(#[from] netcdf_io::NetCdfError),

    #[error("Source file has no per-day date: {0}")]
    UndatedSource(PathBuf),
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
