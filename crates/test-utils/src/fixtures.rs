//! On-disk fixtures: raw binary grids and region tables.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Region tables used across tests, as `(N, S, W, E)`.
pub mod regions {
    /// Small box over the Ethiopian highlands
    pub const ADDIS: (f64, f64, f64, f64) = (9.1, 8.9, 38.6, 38.9);

    /// Box over Lake Victoria
    pub const VICTORIA: (f64, f64, f64, f64) = (0.5, -3.0, 31.5, 34.0);

    /// Entirely west of the ARC2 domain
    pub const ATLANTIC: (f64, f64, f64, f64) = (10.0, 5.0, -40.0, -30.0);
}

/// Encode values as big-endian `f32` in the order given.
pub fn encode_big_endian(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// Write a headerless big-endian grid, creating parent directories.
///
/// `values` is row-major `[lat][lon]`, which is also the on-disk order of
/// ARC2 `daily_clim.bin` files.
pub fn write_binary_grid(path: &Path, values: &[f32]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(path, encode_big_endian(values)).expect("Failed to write binary fixture");
    path.to_path_buf()
}

/// Like [`write_binary_grid`] but gzip-compressed.
pub fn write_binary_grid_gz(path: &Path, values: &[f32]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&encode_big_endian(values))
        .expect("Failed to compress fixture");
    let compressed = encoder.finish().expect("Failed to finish gzip stream");
    fs::write(path, compressed).expect("Failed to write gzip fixture");
    path.to_path_buf()
}

/// Write a region CSV with `N,S,W,E` plus one `name` column.
pub fn write_region_csv(path: &Path, rows: &[(&str, (f64, f64, f64, f64))]) -> PathBuf {
    let mut body = String::from("name,N,S,W,E\n");
    for (name, (n, s, w, e)) in rows {
        body.push_str(&format!("{name},{n},{s},{w},{e}\n"));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(path, body).expect("Failed to write region fixture");
    path.to_path_buf()
}

/// Consecutive days starting at `start`.
pub fn days_from(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    start.iter_days().take(count).collect()
}
