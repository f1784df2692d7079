//! Time-series assembly over dated grid files.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use binary_parser::BinaryGridDecoder;
use grid_processor::{GridSource, RegionAggregator};
use netcdf_io::NetCdfGridSource;
use rfe_common::{DateRange, DatedFile, Product, Region, SourceLayout};

use crate::error::{ExtractionError, Result};
use crate::table::{Orientation, TimeSeriesTable};

/// Builds a [`TimeSeriesTable`] for one product and date range.
///
/// Files are decoded and aggregated independently on the rayon pool, then
/// merged in date order and reconciled against the range's expected dates.
#[derive(Debug, Clone)]
pub struct TimeSeriesAssembler {
    product: Product,
    range: DateRange,
    aggregator: RegionAggregator,
    decoder: BinaryGridDecoder,
}

impl TimeSeriesAssembler {
    pub fn new(product: Product, range: DateRange) -> Self {
        Self {
            product,
            range,
            aggregator: RegionAggregator::new(),
            decoder: BinaryGridDecoder::new(product.geometry()),
        }
    }

    /// Decoder used for non-netCDF sources.
    pub fn with_decoder(mut self, decoder: BinaryGridDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn product(&self) -> Product {
        self.product
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    /// Dates the table is reconciled against.
    pub fn expected_dates(&self) -> Vec<NaiveDate> {
        self.range.expected_dates(self.product.date_policy())
    }

    /// Aggregate every region over `files`.
    pub fn assemble(&self, files: &[DatedFile], regions: &[Region]) -> TimeSeriesTable {
        let expected = self.expected_dates();
        let table = match self.product.layout() {
            SourceLayout::DailyFiles => self.assemble_daily(files, regions, &expected),
            SourceLayout::YearlyFiles => self.assemble_yearly(files, regions, &expected),
        };
        info!(
            product = %self.product,
            files = files.len(),
            regions = regions.len(),
            dates = table.len(),
            "Assembled time series"
        );
        table
    }

    /// One column per expected date. Dates without a usable file are filled
    /// with missing values.
    fn assemble_daily(
        &self,
        files: &[DatedFile],
        regions: &[Region],
        expected: &[NaiveDate],
    ) -> TimeSeriesTable {
        let wanted: BTreeSet<NaiveDate> = expected.iter().copied().collect();

        let mut results: Vec<(NaiveDate, Vec<f64>)> = files
            .par_iter()
            .filter_map(|file| {
                let date = file.key.date().filter(|d| wanted.contains(d))?;
                Some((date, self.daily_values(&file.path, regions)))
            })
            .collect();
        results.sort_by_key(|(date, _)| *date);

        let mut table = TimeSeriesTable::new(Orientation::RegionsByDate, regions.len());
        for (date, values) in results {
            table.insert(date, values);
        }

        for date in expected {
            if !table.contains(*date) {
                warn!(date = %date, "No data file for date, marking all regions missing");
                table.insert_missing(*date);
            }
        }
        table
    }

    fn daily_values(&self, path: &Path, regions: &[Region]) -> Vec<f64> {
        let missing = || vec![f64::NAN; regions.len()];

        let source = match self.open_source(path) {
            Ok(source) => source,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable file");
                return missing();
            }
        };
        if source.time_len() != 1 {
            warn!(
                file = %path.display(),
                steps = source.time_len(),
                "Daily file does not hold exactly one time step"
            );
            return missing();
        }

        match self.aggregator.aggregate_all(source.as_ref(), regions) {
            Ok(per_region) => per_region
                .into_iter()
                .map(|steps| steps.first().copied().unwrap_or(f64::NAN))
                .collect(),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Aggregation failed");
                missing()
            }
        }
    }

    /// One row per expected date found in the yearly files. Absent dates are
    /// reported but not added.
    fn assemble_yearly(
        &self,
        files: &[DatedFile],
        regions: &[Region],
        expected: &[NaiveDate],
    ) -> TimeSeriesTable {
        let wanted: BTreeSet<NaiveDate> = expected.iter().copied().collect();

        let mut results: Vec<(NaiveDate, Vec<f64>)> = files
            .par_iter()
            .flat_map_iter(|file| self.yearly_rows(&file.path, regions, &wanted))
            .collect();
        results.sort_by_key(|(date, _)| *date);

        let mut table = TimeSeriesTable::new(Orientation::DatesByRegion, regions.len());
        for (date, values) in results {
            table.insert(date, values);
        }

        let absent: Vec<&NaiveDate> = expected.iter().filter(|d| !table.contains(**d)).collect();
        if let (Some(first), Some(last)) = (absent.first(), absent.last()) {
            warn!(
                count = absent.len(),
                first = %first,
                last = %last,
                "Expected dates absent from yearly files"
            );
        }
        table
    }

    fn yearly_rows(
        &self,
        path: &Path,
        regions: &[Region],
        wanted: &BTreeSet<NaiveDate>,
    ) -> Vec<(NaiveDate, Vec<f64>)> {
        let source = match NetCdfGridSource::open_variable(path, self.product.data_variable())
            .or_else(|_| NetCdfGridSource::open(path))
        {
            Ok(source) => source,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping unreadable file");
                return Vec::new();
            }
        };

        let per_region = match self.aggregator.aggregate_all(&source, regions) {
            Ok(values) => values,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Aggregation failed");
                return Vec::new();
            }
        };

        let rows: Vec<(NaiveDate, Vec<f64>)> = source
            .dates()
            .iter()
            .enumerate()
            .filter(|(_, date)| wanted.contains(*date))
            .map(|(t, date)| {
                let row = per_region
                    .iter()
                    .map(|steps| steps.get(t).copied().unwrap_or(f64::NAN))
                    .collect();
                (*date, row)
            })
            .collect();

        debug!(file = %path.display(), rows = rows.len(), "Read yearly file");
        rows
    }

    /// `.nc` files are read through netCDF, anything else as a binary grid.
    fn open_source(&self, path: &Path) -> Result<Box<dyn GridSource>> {
        let unreadable = |message: String| ExtractionError::SourceUnreadable {
            path: path.to_path_buf(),
            message,
        };

        if path.extension().is_some_and(|ext| ext == "nc") {
            let source = NetCdfGridSource::open_variable(path, self.product.data_variable())
                .or_else(|_| NetCdfGridSource::open(path))
                .map_err(|e| unreadable(e.to_string()))?;
            Ok(Box::new(source))
        } else {
            let grid = self
                .decoder
                .decode_file(path)
                .map_err(|e| unreadable(e.to_string()))?;
            Ok(Box::new(grid))
        }
    }
}
