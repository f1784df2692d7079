//! Writing the extraction table and summarizing the run.

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use rfe_common::Region;
use storage::DataLayout;

use crate::error::{ExtractionError, Result};
use crate::regions::RegionTable;
use crate::table::TimeSeriesTable;

/// Rows shown in the run summary.
pub const PREVIEW_ROWS: usize = 5;

/// Write `table` as CSV to `path`, creating parent directories.
pub fn write_table(table: &TimeSeriesTable, regions: &RegionTable, path: &Path) -> Result<()> {
    let write_err = |message: String| ExtractionError::OutputWrite {
        path: path.to_path_buf(),
        message,
    };

    if let Some(parent) = path.parent() {
        DataLayout::ensure_dir(parent).map_err(|e| write_err(e.to_string()))?;
    }
    let file = File::create(path).map_err(|e| write_err(e.to_string()))?;
    table
        .write_csv(regions, BufWriter::new(file))
        .map_err(|e| write_err(e.to_string()))?;

    info!(file = %path.display(), rows = table.len(), "Wrote extraction table");
    Ok(())
}

/// What a run produced: the output file, a preview of its rows and the
/// region boundaries used.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub path: PathBuf,
    pub created: bool,
    pub header: Vec<String>,
    pub preview: Vec<Vec<String>>,
    pub regions: Vec<Region>,
}

impl RunSummary {
    pub fn new(path: &Path, table: &TimeSeriesTable, regions: &RegionTable) -> Self {
        let (header, rows) = table.rows(regions);
        Self {
            path: path.to_path_buf(),
            created: path.is_file(),
            header,
            preview: rows.into_iter().take(PREVIEW_ROWS).collect(),
            regions: regions.regions().to_vec(),
        }
    }

    /// Log the outcome.
    pub fn log(&self) {
        if self.created {
            info!(
                file = %self.path.display(),
                regions = self.regions.len(),
                "Extraction complete"
            );
        } else {
            warn!(file = %self.path.display(), "Output file was not created");
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header.join(","))?;
        for row in &self.preview {
            writeln!(f, "{}", row.join(","))?;
        }
        writeln!(f)?;

        writeln!(f, "Region boundaries (N, S, W, E):")?;
        for (i, r) in self.regions.iter().enumerate() {
            writeln!(f, "  {i}: {}, {}, {}, {}", r.north, r.south, r.west, r.east)?;
        }
        writeln!(f)?;

        if self.created {
            write!(f, "Success! Created file: {}", self.path.display())
        } else {
            write!(f, "Warning! File not created: {}", self.path.display())
        }
    }
}
