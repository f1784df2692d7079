//! netCDF-4 I/O for daily rainfall grids.
//!
//! Reading goes through [`NetCdfGridSource`], which implements
//! [`grid_processor::GridSource`] so region windows are read straight from
//! disk. Writing goes through [`GridEncoder`], which produces the CF-1.7
//! layout used for converted ARC2 files:
//!
//! ```text
//! dimensions:  time = UNLIMITED, lat = 801, lon = 751
//! variables:   double lon(lon), double lat(lat), int time(time)
//!              float rfe(time, lat, lon)   deflate 9, _FillValue -9999
//! ```
//!
//! The netcdf crate links libnetcdf/HDF5 (system packages `libnetcdf-dev`
//! and `libhdf5-dev`).

pub mod error;
mod native;
mod reader;
mod writer;

pub use error::{NetCdfError, NetCdfResult};
pub use native::{offsets_to_dates, parse_time_units, silence_hdf5_errors, TimeUnit};
pub use reader::{NetCdfGridSource, DATA_VARIABLES};
pub use writer::{EncoderMetadata, GridEncoder};
