//! Layout normalization for decoded grids.
//!
//! A small row-major 2-D buffer with the two operations needed to turn a
//! column-major dump into north/south-consistent row-major order.

/// Row-major 2-D array of `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct Array2 {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Array2 {
    /// Wrap row-major data. Returns `None` if the length does not match.
    pub fn from_row_major(data: Vec<f32>, rows: usize, cols: usize) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self { rows, cols, data })
    }

    /// Reshape a flat buffer into `(rows, cols)` reading it column-major
    /// (first index fastest).
    pub fn from_column_major(values: &[f32], rows: usize, cols: usize) -> Option<Self> {
        if values.len() != rows * cols {
            return None;
        }
        let mut data = Vec::with_capacity(values.len());
        for r in 0..rows {
            for c in 0..cols {
                data.push(values[r + rows * c]);
            }
        }
        Some(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    /// Rotate 90° counter-clockwise. Shape `(r, c)` becomes `(c, r)`.
    pub fn rot90(&self) -> Self {
        let (rows, cols) = (self.cols, self.rows);
        let mut data = Vec::with_capacity(self.data.len());
        for r in 0..rows {
            for c in 0..cols {
                data.push(self.data[c * self.cols + (self.cols - 1 - r)]);
            }
        }
        Self { rows, cols, data }
    }

    /// Reverse the row order.
    pub fn flipud(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for row in self.data.chunks_exact(self.cols.max(1)).rev() {
            data.extend_from_slice(row);
        }
        Self {
            rows: self.rows,
            cols: self.cols,
            data,
        }
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: f32) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.data.iter()
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Array2 {
        // 1 2 3
        // 4 5 6
        Array2::from_row_major(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap()
    }

    #[test]
    fn test_rot90() {
        let rotated = sample().rot90();
        // 3 6
        // 2 5
        // 1 4
        assert_eq!(rotated.rows(), 3);
        assert_eq!(rotated.cols(), 2);
        assert_eq!(rotated.into_vec(), vec![3.0, 6.0, 2.0, 5.0, 1.0, 4.0]);
    }

    #[test]
    fn test_flipud() {
        let flipped = sample().flipud();
        assert_eq!(flipped.into_vec(), vec![4.0, 5.0, 6.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_from_column_major() {
        let arr = Array2::from_column_major(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        // 1 3 5
        // 2 4 6
        assert_eq!(arr.get(0, 1), Some(3.0));
        assert_eq!(arr.get(1, 2), Some(6.0));
        assert!(Array2::from_column_major(&[1.0], 2, 3).is_none());
    }

    #[test]
    fn test_column_major_rot_flip_is_row_major_file_order() {
        let values: Vec<f32> = (0..12).map(|v| v as f32).collect();
        // nx = 4 (fastest on disk), ny = 3
        let normalized = Array2::from_column_major(&values, 4, 3)
            .unwrap()
            .rot90()
            .flipud();
        assert_eq!(normalized.rows(), 3);
        assert_eq!(normalized.cols(), 4);
        assert_eq!(normalized.into_vec(), values);
    }
}
