//! Region extraction over rainfall grids.
//!
//! Given a grid's coordinate axes and a rectangular [`Region`], this crate
//! selects the enclosed cells and reduces them to an area mean per time step:
//!
//! ```text
//! Region { N, S, W, E }
//!      │
//!      ▼
//! select_window(axes)        lat ∈ [S, N], lon ∈ [W, E], per-axis order
//!      │
//!      ▼
//! GridSource::read_window    in-memory grid or netCDF hyperslab
//!      │
//!      ▼
//! area_mean → round_one_decimal   missing cells skipped, empty → NaN
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::RegionAggregator;
//!
//! let means = RegionAggregator::new().aggregate(&grid, &region)?;
//! ```
//!
//! [`Region`]: rfe_common::Region

pub mod aggregate;
pub mod error;
pub mod source;
pub mod types;

pub use aggregate::{area_mean, round_one_decimal, select_window, RegionAggregator};
pub use error::{GridProcessorError, Result};
pub use source::GridSource;
pub use types::{Window, WindowData};
