//! Common types and utilities shared across the rainfall-estimate crates.

pub mod bbox;
pub mod error;
pub mod filename;
pub mod grid;
pub mod product;
pub mod time;

pub use bbox::Region;
pub use error::{CommonError, CommonResult};
pub use filename::{DateKey, DatedFile, FileKey, FilenamePattern};
pub use grid::{AxisOrder, CoordinateAxes, CoordinateAxis, Grid, GridGeometry, SENTINEL};
pub use product::{Product, SourceLayout};
pub use time::{DateRange, DateRangePolicy};
