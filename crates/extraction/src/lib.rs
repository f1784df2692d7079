//! Area-average rainfall time series for rectangular regions.
//!
//! An extraction run reads a region table, discovers the gridded files of a
//! product inside the requested date range, aggregates every region over
//! every file and writes one CSV table:
//!
//! ```text
//! regions.csv ──► RegionTable
//!                     │
//! <root>/netcdf ──► discover_in_range ──► TimeSeriesAssembler ──► TimeSeriesTable
//!                                          (rayon, per file)           │
//!                                                                      ▼
//!                                          <root>/output/<product>_<start>-<end>_<tag>.csv
//! ```
//!
//! Per-day products (ARC2) get one column per date of the exclusive range;
//! per-year products (CHIRPS) one row per date of the inclusive range that
//! the yearly files actually hold.

pub mod assembler;
pub mod error;
pub mod output;
pub mod regions;
pub mod table;

use std::path::PathBuf;

use tracing::info;

use rfe_common::{DateRange, Product};
use storage::{discover_in_range, DataLayout};

pub use assembler::TimeSeriesAssembler;
pub use error::{ExtractionError, Result};
pub use output::{write_table, RunSummary, PREVIEW_ROWS};
pub use regions::{RegionTable, BOUND_DECIMALS};
pub use table::{format_value, Orientation, TimeSeriesTable, MISSING};

/// Everything an extraction run needs.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub product: Product,
    pub range: DateRange,
    pub regions_file: PathBuf,
    pub layout: DataLayout,
    /// Output filename suffix
    pub tag: String,
}

impl ExtractionRequest {
    /// Where the table for this request is written.
    pub fn output_path(&self) -> PathBuf {
        self.layout.output_path(self.product, &self.range, &self.tag)
    }
}

/// Run one extraction and write its table.
///
/// Fails on an unreadable region table, a missing gridded-data directory or
/// an unwritable output. Unreadable grid files only produce missing values.
pub fn run_extraction(request: &ExtractionRequest) -> Result<RunSummary> {
    let regions = RegionTable::from_path(&request.regions_file)?;

    let source_dir = request.layout.netcdf_dir();
    let files = discover_in_range(
        &source_dir,
        &request.product.gridded_pattern(),
        &request.range,
        request.product.date_policy(),
    )?;
    info!(
        product = %request.product,
        dir = %source_dir.display(),
        files = files.len(),
        regions = regions.len(),
        "Starting extraction"
    );

    let table = TimeSeriesAssembler::new(request.product, request.range)
        .assemble(&files, regions.regions());

    let path = request.output_path();
    write_table(&table, &regions, &path)?;

    let summary = RunSummary::new(&path, &table, &regions);
    summary.log();
    Ok(summary)
}
