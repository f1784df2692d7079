//! Conversion of retrieved ARC2 binary grids into netCDF-4.
//!
//! The converted tree doubles as a cache: a binary source is converted only
//! when no netCDF file for its date exists yet. Sources are read in place;
//! gzip-compressed ones are inflated in memory and left on disk as they are.

mod converter;
pub mod error;

pub use converter::{files_to_convert, ConversionReport, ConvertOutcome, Converter};
pub use error::{IngestionError, Result};
