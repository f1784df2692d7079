//! Grid source trait and implementations.

mod memory;

use std::ops::Range;

use rfe_common::CoordinateAxes;

use crate::error::Result;
use crate::types::{Window, WindowData};

/// Read access to a time-stacked rainfall grid.
///
/// Implemented by in-memory [`rfe_common::Grid`]s (decoded binary files) and
/// by lazily read netCDF files, where only the requested window is fetched
/// from disk.
pub trait GridSource {
    /// Coordinate axes of the grid, in storage order.
    fn axes(&self) -> &CoordinateAxes;

    /// Number of time steps.
    fn time_len(&self) -> usize;

    /// Read `window` for each time step in `times`.
    fn read_window(&self, times: Range<usize>, window: &Window) -> Result<WindowData>;
}
