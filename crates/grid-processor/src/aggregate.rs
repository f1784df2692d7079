//! Area-mean aggregation over rectangular regions.

use rfe_common::{CoordinateAxes, Region};
use tracing::debug;

use crate::error::Result;
use crate::source::GridSource;
use crate::types::{Window, WindowData};

/// Index window covering `region` on `axes`.
///
/// Longitude is matched against `[west, east]` and latitude against
/// `[south, north]`, each following its axis's own ordering. Returns `None`
/// when the region does not intersect the grid or is inverted.
pub fn select_window(axes: &CoordinateAxes, region: &Region) -> Option<Window> {
    let rows = axes.lat.index_range(region.south, region.north)?;
    let cols = axes.lon.index_range(region.west, region.east)?;
    Some(Window::new(rows, cols))
}

/// Arithmetic mean of the cells that are neither NaN nor `fill_value`.
///
/// Returns NaN when no cell qualifies.
pub fn area_mean(cells: &[f32], fill_value: f32) -> f64 {
    let (sum, count) = cells
        .iter()
        .filter(|v| !v.is_nan() && **v != fill_value)
        .fold((0.0f64, 0usize), |(sum, count), v| (sum + *v as f64, count + 1));

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Round to one decimal place, halves to even. NaN stays NaN.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Computes per-region, per-time-step area means over a [`GridSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionAggregator;

impl RegionAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Area mean of `region` for every time step of `source`, rounded to one
    /// decimal. Regions outside the grid yield NaN for every step.
    pub fn aggregate(&self, source: &dyn GridSource, region: &Region) -> Result<Vec<f64>> {
        let nt = source.time_len();
        let Some(window) = select_window(source.axes(), region) else {
            debug!(?region, "Region does not intersect grid");
            return Ok(vec![f64::NAN; nt]);
        };

        let data = source.read_window(0..nt, &window)?;
        Ok(step_means(&data))
    }

    /// Aggregate every region. The outer vector follows `regions`, the inner
    /// one the source's time steps.
    pub fn aggregate_all(
        &self,
        source: &dyn GridSource,
        regions: &[Region],
    ) -> Result<Vec<Vec<f64>>> {
        regions
            .iter()
            .map(|region| self.aggregate(source, region))
            .collect()
    }
}

fn step_means(data: &WindowData) -> Vec<f64> {
    (0..data.nt)
        .map(|t| round_one_decimal(area_mean(data.step(t), data.fill_value)))
        .collect()
}
