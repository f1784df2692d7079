//! Grid specifications and in-memory rainfall grids.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

/// Conventional "no data" marker used by the rainfall products.
pub const SENTINEL: f32 = -9999.0;

/// Tolerance (degrees) when comparing axis coordinates against region bounds.
///
/// Evenly spaced axes are generated in floating point, so a coordinate that
/// is nominally `30.0` may be stored as `30.000000000000004`.
const COORD_EPSILON: f64 = 1e-6;

/// Direction in which a coordinate axis runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisOrder {
    Ascending,
    Descending,
}

/// A monotonic 1-D coordinate axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateAxis {
    values: Vec<f64>,
}

impl CoordinateAxis {
    /// Build an axis from stored coordinate values.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Evenly spaced axis from `start` to `stop` inclusive with `n` points.
    pub fn linspace(start: f64, stop: f64, n: usize) -> Self {
        let values = match n {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (stop - start) / (n - 1) as f64;
                (0..n).map(|i| start + i as f64 * step).collect()
            }
        };
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Ordering of the axis. Axes with fewer than two points count as ascending.
    pub fn order(&self) -> AxisOrder {
        match (self.values.first(), self.values.last()) {
            (Some(first), Some(last)) if last < first => AxisOrder::Descending,
            _ => AxisOrder::Ascending,
        }
    }

    /// Smallest coordinate on the axis.
    pub fn min(&self) -> Option<f64> {
        match self.order() {
            AxisOrder::Ascending => self.values.first().copied(),
            AxisOrder::Descending => self.values.last().copied(),
        }
    }

    /// Largest coordinate on the axis.
    pub fn max(&self) -> Option<f64> {
        match self.order() {
            AxisOrder::Ascending => self.values.last().copied(),
            AxisOrder::Descending => self.values.first().copied(),
        }
    }

    /// Absolute spacing between the first two points.
    pub fn resolution(&self) -> Option<f64> {
        match self.values.as_slice() {
            [a, b, ..] => Some((b - a).abs()),
            _ => None,
        }
    }

    /// Contiguous index range of the coordinates lying in `[lo, hi]`.
    ///
    /// The range follows the axis's own storage order, so it is valid for
    /// ascending and descending axes alike. Returns `None` when no coordinate
    /// falls inside the interval, including when `lo > hi`.
    pub fn index_range(&self, lo: f64, hi: f64) -> Option<Range<usize>> {
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return None;
        }

        let (start, end) = match self.order() {
            AxisOrder::Ascending => (
                self.values.partition_point(|&v| v < lo - COORD_EPSILON),
                self.values.partition_point(|&v| v <= hi + COORD_EPSILON),
            ),
            AxisOrder::Descending => (
                self.values.partition_point(|&v| v > hi + COORD_EPSILON),
                self.values.partition_point(|&v| v >= lo - COORD_EPSILON),
            ),
        };

        (start < end).then_some(start..end)
    }
}

/// Latitude and longitude axes of a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateAxes {
    pub lat: CoordinateAxis,
    pub lon: CoordinateAxis,
}

impl CoordinateAxes {
    pub fn new(lat: CoordinateAxis, lon: CoordinateAxis) -> Self {
        Self { lat, lon }
    }

    /// Number of latitude points (rows).
    pub fn ny(&self) -> usize {
        self.lat.len()
    }

    /// Number of longitude points (columns).
    pub fn nx(&self) -> usize {
        self.lon.len()
    }
}

/// Fixed geometry of a rainfall product: dimensions and domain extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Number of points in the longitude direction
    pub nx: usize,
    /// Number of points in the latitude direction
    pub ny: usize,
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl GridGeometry {
    /// ARC2 Africa grid: 0.1°, 20°W–55°E, 40°S–40°N.
    pub fn arc2() -> Self {
        Self {
            nx: 751,
            ny: 801,
            lon_min: -20.0,
            lon_max: 55.0,
            lat_min: -40.0,
            lat_max: 40.0,
        }
    }

    /// CHIRPS p05 quasi-global grid: 0.05° cell centres, 50°S–50°N.
    pub fn chirps_p05() -> Self {
        Self {
            nx: 7200,
            ny: 2000,
            lon_min: -179.975,
            lon_max: 179.975,
            lat_min: -49.975,
            lat_max: 49.975,
        }
    }

    /// Total number of grid points in one time step.
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.nx == 0 || self.ny == 0
    }

    pub fn lon_resolution(&self) -> f64 {
        if self.nx < 2 {
            return 0.0;
        }
        (self.lon_max - self.lon_min) / (self.nx - 1) as f64
    }

    pub fn lat_resolution(&self) -> f64 {
        if self.ny < 2 {
            return 0.0;
        }
        (self.lat_max - self.lat_min) / (self.ny - 1) as f64
    }

    /// Coordinate axes for this geometry; latitude ascends from `lat_min`.
    pub fn axes(&self) -> CoordinateAxes {
        CoordinateAxes::new(
            CoordinateAxis::linspace(self.lat_min, self.lat_max, self.ny),
            CoordinateAxis::linspace(self.lon_min, self.lon_max, self.nx),
        )
    }
}

/// A time-stacked rainfall grid laid out `[time][lat][lon]`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    nt: usize,
    data: Vec<f32>,
    axes: CoordinateAxes,
    fill_value: f32,
}

impl Grid {
    /// Create a grid, checking that `data` matches `nt * ny * nx`.
    pub fn new(
        data: Vec<f32>,
        nt: usize,
        axes: CoordinateAxes,
        fill_value: f32,
    ) -> CommonResult<Self> {
        let expected = nt * axes.ny() * axes.nx();
        if data.len() != expected {
            return Err(CommonError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            nt,
            data,
            axes,
            fill_value,
        })
    }

    /// Create a single-timestep grid.
    pub fn single(data: Vec<f32>, axes: CoordinateAxes, fill_value: f32) -> CommonResult<Self> {
        Self::new(data, 1, axes, fill_value)
    }

    /// Stack single-timestep grids sharing the same axes into one grid.
    pub fn stack(grids: &[Grid]) -> CommonResult<Self> {
        let Some(first) = grids.first() else {
            return Err(CommonError::ShapeMismatch {
                expected: 1,
                actual: 0,
            });
        };

        let step = first.axes.ny() * first.axes.nx();
        let mut data = Vec::with_capacity(step * grids.len());
        let mut nt = 0;
        for grid in grids {
            if grid.axes != first.axes {
                return Err(CommonError::ShapeMismatch {
                    expected: step,
                    actual: grid.axes.ny() * grid.axes.nx(),
                });
            }
            data.extend_from_slice(&grid.data);
            nt += grid.nt;
        }

        Self::new(data, nt, first.axes.clone(), first.fill_value)
    }

    pub fn nt(&self) -> usize {
        self.nt
    }

    pub fn ny(&self) -> usize {
        self.axes.ny()
    }

    pub fn nx(&self) -> usize {
        self.axes.nx()
    }

    pub fn axes(&self) -> &CoordinateAxes {
        &self.axes
    }

    pub fn fill_value(&self) -> f32 {
        self.fill_value
    }

    /// All values, `[time][lat][lon]`.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Values of one time step, `[lat][lon]`.
    pub fn time_slice(&self, t: usize) -> Option<&[f32]> {
        let step = self.ny() * self.nx();
        self.data.get(t * step..(t + 1) * step)
    }

    /// Value at (time, row, column).
    pub fn value(&self, t: usize, row: usize, col: usize) -> Option<f32> {
        if t >= self.nt || row >= self.ny() || col >= self.nx() {
            return None;
        }
        self.data
            .get((t * self.ny() + row) * self.nx() + col)
            .copied()
    }

    /// True when `value` is NaN or equals the grid's fill value.
    pub fn is_missing(&self, value: f32) -> bool {
        value.is_nan() || value == self.fill_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc2_axes() {
        let axes = GridGeometry::arc2().axes();
        assert_eq!(axes.nx(), 751);
        assert_eq!(axes.ny(), 801);
        assert_eq!(axes.lon.values()[0], -20.0);
        assert!((axes.lon.values()[750] - 55.0).abs() < 1e-9);
        assert!((axes.lat.resolution().unwrap() - 0.1).abs() < 1e-9);
        assert_eq!(axes.lat.order(), AxisOrder::Ascending);
    }

    #[test]
    fn test_index_range_ascending() {
        let axis = CoordinateAxis::linspace(0.0, 10.0, 11);
        assert_eq!(axis.index_range(2.0, 4.0), Some(2..5));
        assert_eq!(axis.index_range(2.5, 2.7), None);
        assert_eq!(axis.index_range(-5.0, 0.0), Some(0..1));
        assert_eq!(axis.index_range(11.0, 12.0), None);
    }

    #[test]
    fn test_index_range_descending() {
        let axis = CoordinateAxis::linspace(10.0, 0.0, 11);
        assert_eq!(axis.order(), AxisOrder::Descending);
        // values[2] = 8.0, values[4] = 6.0
        assert_eq!(axis.index_range(6.0, 8.0), Some(2..5));
        assert_eq!(axis.index_range(-1.0, 100.0), Some(0..11));
    }

    #[test]
    fn test_index_range_inverted_bounds() {
        let axis = CoordinateAxis::linspace(0.0, 10.0, 11);
        assert_eq!(axis.index_range(4.0, 2.0), None);
        assert_eq!(axis.index_range(f64::NAN, 2.0), None);
    }

    #[test]
    fn test_index_range_float_noise() {
        let axis = GridGeometry::arc2().axes().lon;
        // 30°E is index 500 but is not stored exactly
        let range = axis.index_range(30.0, 30.0).unwrap();
        assert_eq!(range, 500..501);
    }

    #[test]
    fn test_grid_shape_checked() {
        let axes = CoordinateAxes::new(
            CoordinateAxis::linspace(0.0, 1.0, 2),
            CoordinateAxis::linspace(0.0, 2.0, 3),
        );
        assert!(Grid::single(vec![0.0; 6], axes.clone(), SENTINEL).is_ok());
        assert!(matches!(
            Grid::single(vec![0.0; 5], axes, SENTINEL),
            Err(CommonError::ShapeMismatch { expected: 6, actual: 5 })
        ));
    }

    #[test]
    fn test_grid_stack_and_value() {
        let axes = CoordinateAxes::new(
            CoordinateAxis::linspace(0.0, 1.0, 2),
            CoordinateAxis::linspace(0.0, 1.0, 2),
        );
        let a = Grid::single(vec![1.0, 2.0, 3.0, 4.0], axes.clone(), SENTINEL).unwrap();
        let b = Grid::single(vec![5.0, 6.0, 7.0, 8.0], axes, SENTINEL).unwrap();
        let stacked = Grid::stack(&[a, b]).unwrap();

        assert_eq!(stacked.nt(), 2);
        assert_eq!(stacked.value(1, 1, 0), Some(7.0));
        assert_eq!(stacked.time_slice(0), Some(&[1.0, 2.0, 3.0, 4.0][..]));
        assert_eq!(stacked.value(2, 0, 0), None);
    }
}
