//! Directory layout under the data root.
//!
//! ```text
//! <root>/bin/daily_clim.bin.YYYYMMDD.gz              retrieved ARC2 binaries
//! <root>/netcdf/YYYY/MM/arc2.0_YYYYMMDD_0.10.nc      converted ARC2 grids
//! <root>/netcdf/chirps-v2.0.YYYY.days_p05.nc         retrieved CHIRPS years
//! <root>/output/<tag>_<start>-<end>_<run>.csv        extraction tables
//! ```

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};

use rfe_common::{DateRange, Product};

use crate::error::StorageResult;

/// Paths of every artifact the pipeline reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Retrieved binary files.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// Gridded files, converted or retrieved.
    pub fn netcdf_dir(&self) -> PathBuf {
        self.root.join("netcdf")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    /// Where retrieval stores a product's remote files.
    pub fn download_dir(&self, product: Product) -> PathBuf {
        if product.needs_conversion() {
            self.bin_dir()
        } else {
            self.netcdf_dir()
        }
    }

    /// Converted ARC2 grid for `date`, under `netcdf/YYYY/MM/`.
    pub fn converted_path(&self, date: NaiveDate) -> PathBuf {
        self.netcdf_dir()
            .join(format!("{:04}", date.year()))
            .join(format!("{:02}", date.month()))
            .join(Product::Arc2.gridded_pattern().format_day(date))
    }

    /// Extraction table for a run.
    pub fn output_path(&self, product: Product, range: &DateRange, tag: &str) -> PathBuf {
        self.output_dir().join(format!(
            "{}_{}_{}.csv",
            product.tag(),
            range.compact_label(),
            tag
        ))
    }

    /// Create `dir` and its parents if missing.
    pub fn ensure_dir(dir: &Path) -> StorageResult<()> {
        std::fs::create_dir_all(dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converted_path() {
        let layout = DataLayout::new("/data");
        let date = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        assert_eq!(
            layout.converted_path(date),
            PathBuf::from("/data/netcdf/2021/06/arc2.0_20210601_0.10.nc")
        );
    }

    #[test]
    fn test_output_path() {
        let layout = DataLayout::new("/data");
        let range = DateRange::parse("2021-05-20", "2021-06-08").unwrap();
        assert_eq!(
            layout.output_path(Product::Arc2, &range, "run1"),
            PathBuf::from("/data/output/arc2.0_20210520-20210608_run1.csv")
        );
        assert_eq!(
            layout.output_path(Product::Chirps, &range, "run1"),
            PathBuf::from("/data/output/chirps-v2.0_20210520-20210608_run1.csv")
        );
    }

    #[test]
    fn test_download_dir_per_product() {
        let layout = DataLayout::new("/data");
        assert_eq!(layout.download_dir(Product::Arc2), PathBuf::from("/data/bin"));
        assert_eq!(layout.download_dir(Product::Chirps), PathBuf::from("/data/netcdf"));
    }
}
