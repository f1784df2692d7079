//! Core types for grid processing.

use std::ops::Range;

/// Index window into a grid: a contiguous run of rows (latitude) and
/// columns (longitude), in storage order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl Window {
    pub fn new(rows: Range<usize>, cols: Range<usize>) -> Self {
        Self { rows, cols }
    }

    /// Number of cells in one time step of the window.
    pub fn len(&self) -> usize {
        self.rows.len() * self.cols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the window fits inside a `ny * nx` grid.
    pub fn fits(&self, ny: usize, nx: usize) -> bool {
        self.rows.end <= ny && self.cols.end <= nx
    }
}

/// Values read for a window over a run of time steps, laid out
/// `[time][row][col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowData {
    pub values: Vec<f32>,
    pub nt: usize,
    /// Cells equal to this value are missing, as are NaN cells.
    pub fill_value: f32,
}

impl WindowData {
    /// Cells of time step `t`.
    pub fn step(&self, t: usize) -> &[f32] {
        if self.nt == 0 {
            return &[];
        }
        let step = self.values.len() / self.nt;
        self.values.get(t * step..(t + 1) * step).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_len() {
        let window = Window::new(2..4, 5..8);
        assert_eq!(window.len(), 6);
        assert!(window.fits(4, 8));
        assert!(!window.fits(3, 8));
        assert!(Window::new(2..2, 0..3).is_empty());
    }

    #[test]
    fn test_window_data_step() {
        let data = WindowData {
            values: vec![1.0, 2.0, 3.0, 4.0],
            nt: 2,
            fill_value: -9999.0,
        };
        assert_eq!(data.step(1), &[3.0, 4.0]);
        assert!(data.step(2).is_empty());
    }
}
