//! Binary → netCDF conversion with a date-keyed skip cache.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use binary_parser::BinaryGridDecoder;
use netcdf_io::GridEncoder;
use rfe_common::{DatedFile, FileKey, Product};
use storage::{discover, DataLayout, StorageError};

use crate::error::{IngestionError, Result};

/// Sources whose date has no converted file yet, in date order.
pub fn files_to_convert(sources: &[DatedFile], converted: &[DatedFile]) -> Vec<DatedFile> {
    let done: HashSet<FileKey> = converted.iter().map(|f| f.key).collect();
    sources
        .iter()
        .filter(|f| !done.contains(&f.key))
        .cloned()
        .collect()
}

/// What happened to one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertOutcome {
    Converted(PathBuf),
    AlreadyPresent(PathBuf),
}

/// Outcome of a conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    /// Newly written netCDF files
    pub converted: Vec<PathBuf>,
    /// Sources whose destination appeared between planning and writing
    pub skipped: usize,
    /// Sources that could not be converted, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl ConversionReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Converts retrieved ARC2 binaries under `<root>/bin` into
/// `<root>/netcdf/YYYY/MM/arc2.0_YYYYMMDD_0.10.nc`.
#[derive(Debug, Clone)]
pub struct Converter {
    layout: DataLayout,
    decoder: BinaryGridDecoder,
    encoder: GridEncoder,
}

impl Converter {
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            decoder: BinaryGridDecoder::arc2(),
            encoder: GridEncoder::arc2(),
        }
    }

    pub fn with_decoder(mut self, decoder: BinaryGridDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_encoder(mut self, encoder: GridEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Binary sources that still need converting.
    pub fn plan(&self) -> Result<Vec<DatedFile>> {
        let sources = discover(&self.layout.bin_dir(), &Product::Arc2.remote_pattern())?;
        let converted = match discover(
            &self.layout.netcdf_dir(),
            &Product::Arc2.gridded_pattern(),
        ) {
            Ok(files) => files,
            Err(StorageError::MissingDirectory(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let pending = files_to_convert(&sources, &converted);
        info!(
            sources = sources.len(),
            converted = converted.len(),
            pending = pending.len(),
            "Planned binary conversion"
        );
        Ok(pending)
    }

    /// Convert one source unless its destination already exists.
    pub fn convert_file(&self, source: &DatedFile) -> Result<ConvertOutcome> {
        let date = source
            .key
            .date()
            .ok_or_else(|| IngestionError::UndatedSource(source.path.clone()))?;
        let dest = self.layout.converted_path(date);
        if dest.exists() {
            debug!(file = %dest.display(), "Converted file exists, skipping");
            return Ok(ConvertOutcome::AlreadyPresent(dest));
        }

        let grid = self.decoder.decode_file(&source.path)?;
        self.encoder.encode(&grid, date, date, &dest)?;
        Ok(ConvertOutcome::Converted(dest))
    }

    /// Plan and convert. A failing file is logged and recorded; the rest of
    /// the batch still runs.
    pub fn run(&self) -> Result<ConversionReport> {
        let mut report = ConversionReport::default();
        for source in self.plan()? {
            match self.convert_file(&source) {
                Ok(ConvertOutcome::Converted(dest)) => report.converted.push(dest),
                Ok(ConvertOutcome::AlreadyPresent(_)) => report.skipped += 1,
                Err(e) => {
                    warn!(file = %source.file_name(), error = %e, "Conversion failed");
                    report.failed.push((source.path.clone(), e.to_string()));
                }
            }
        }

        info!(
            converted = report.converted.len(),
            skipped = report.skipped,
            failed = report.failed.len(),
            "Binary conversion complete"
        );
        Ok(report)
    }
}
