//! Error types for netCDF reading and writing.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for netCDF operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for netCDF I/O.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the netCDF library
    #[error("netCDF error: {0}")]
    Library(#[from] netcdf::Error),

    /// Missing required variable, dimension or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Time axis could not be interpreted
    #[error("Invalid time axis: {0}")]
    InvalidTime(String),

    /// Grid does not fit the requested layout
    #[error("Invalid grid: {0}")]
    Grid(#[from] rfe_common::CommonError),
}
