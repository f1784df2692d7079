//! Synthetic rainfall grids.
//!
//! All generators return row-major `Vec<f32>` with row 0 first. Rows follow
//! the latitude axis and columns the longitude axis.

/// Creates a test grid with predictable values.
///
/// Each cell value is `col * 1000 + row`, so a reader can check that
/// `grid[row][col]` landed where expected.
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);   // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a daily rainfall grid in mm.
///
/// Roughly a quarter of the cells are wet, with amounts up to 50 mm rounded
/// to 0.1 mm. The same seed always produces the same grid.
pub fn create_rainfall_grid(width: usize, height: usize, seed: u32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let hash = simple_hash(col as u32, row as u32, seed);
            let rain = if hash % 4 == 0 {
                (hash % 500) as f32 / 10.0
            } else {
                0.0
            };
            data.push(rain);
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a constant grid with `missing` written at the given
/// `(col, row)` positions. Out-of-range positions are ignored.
pub fn create_grid_with_missing(
    width: usize,
    height: usize,
    value: f32,
    missing: f32,
    positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = create_constant_grid(width, height, value);
    for &(col, row) in positions {
        if col < width && row < height {
            data[row * width + col] = missing;
        }
    }
    data
}
