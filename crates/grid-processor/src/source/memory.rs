use std::ops::Range;

use rfe_common::{CoordinateAxes, Grid};

use super::GridSource;
use crate::error::{GridProcessorError, Result};
use crate::types::{Window, WindowData};

impl GridSource for Grid {
    fn axes(&self) -> &CoordinateAxes {
        Grid::axes(self)
    }

    fn time_len(&self) -> usize {
        self.nt()
    }

    fn read_window(&self, times: Range<usize>, window: &Window) -> Result<WindowData> {
        if times.end > self.nt() {
            return Err(GridProcessorError::out_of_bounds(
                format!("time steps {times:?}"),
                format!("{} steps", self.nt()),
            ));
        }
        if !window.fits(self.ny(), self.nx()) {
            return Err(GridProcessorError::out_of_bounds(
                format!("{window:?}"),
                format!("{}x{}", self.ny(), self.nx()),
            ));
        }

        let nt = times.len();
        let mut values = Vec::with_capacity(nt * window.len());
        for t in times {
            let step = self
                .time_slice(t)
                .ok_or_else(|| GridProcessorError::read_failed(format!("time step {t}")))?;
            for row in window.rows.clone() {
                let start = row * self.nx();
                values.extend_from_slice(&step[start + window.cols.start..start + window.cols.end]);
            }
        }

        Ok(WindowData {
            values,
            nt,
            fill_value: self.fill_value(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfe_common::CoordinateAxis;

    fn grid() -> Grid {
        let axes = CoordinateAxes::new(
            CoordinateAxis::linspace(0.0, 0.2, 3),
            CoordinateAxis::linspace(10.0, 10.3, 4),
        );
        let data: Vec<f32> = (0..24).map(|v| v as f32).collect();
        Grid::new(data, 2, axes, -9999.0).unwrap()
    }

    #[test]
    fn test_read_window_across_time() {
        let data = grid().read_window(0..2, &Window::new(1..3, 2..4)).unwrap();
        assert_eq!(data.nt, 2);
        assert_eq!(data.step(0), &[6.0, 7.0, 10.0, 11.0]);
        assert_eq!(data.step(1), &[18.0, 19.0, 22.0, 23.0]);
    }

    #[test]
    fn test_read_window_out_of_bounds() {
        let g = grid();
        assert!(g.read_window(0..3, &Window::new(0..1, 0..1)).is_err());
        assert!(g.read_window(0..1, &Window::new(0..4, 0..1)).is_err());
    }
}
