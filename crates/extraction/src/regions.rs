//! User region tables.
//!
//! A CSV with at least the columns `N`, `S`, `W`, `E` (degrees). Any other
//! columns (names, ids) are kept verbatim and copied to the output.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use rfe_common::Region;

use crate::error::{ExtractionError, Result};

/// Decimal places region bounds are rounded to before selection.
pub const BOUND_DECIMALS: u32 = 4;

const BOUND_COLUMNS: [&str; 4] = ["N", "S", "W", "E"];

/// The parsed region table: headers, raw rows and rounded regions.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTable {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
    regions: Vec<Region>,
}

impl RegionTable {
    /// Read a region table from a CSV file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| ExtractionError::RegionTable {
                path: path.to_path_buf(),
                source,
            })?;
        let table = Self::from_reader(reader, path)?;
        debug!(path = %path.display(), regions = table.len(), "Loaded region table");
        Ok(table)
    }

    /// Read a region table from CSV text.
    pub fn from_csv_str(text: &str) -> Result<Self> {
        let reader = ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());
        Self::from_reader(reader, Path::new("<inline>"))
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>, origin: &Path) -> Result<Self> {
        let csv_err = |source| ExtractionError::RegionTable {
            path: origin.to_path_buf(),
            source,
        };

        let header_record = reader.headers().map_err(csv_err)?.clone();
        let mut indices = [0usize; 4];
        for (slot, name) in indices.iter_mut().zip(BOUND_COLUMNS) {
            *slot = header_record
                .iter()
                .position(|h| h == name)
                .ok_or(ExtractionError::MissingColumn(name))?;
        }

        let mut records = Vec::new();
        let mut regions = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(csv_err)?;
            regions.push(parse_region(&record, &indices, row + 1)?.rounded(BOUND_DECIMALS));
            records.push(record.iter().map(str::to_string).collect());
        }

        if regions.is_empty() {
            return Err(ExtractionError::NoRegions);
        }

        Ok(Self {
            headers: header_record.iter().map(str::to_string).collect(),
            records,
            regions,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Row `i` as written to the output: bound columns replaced by their
    /// rounded values, every other column as read.
    pub fn output_record(&self, i: usize) -> Vec<String> {
        let (Some(record), Some(region)) = (self.records.get(i), self.regions.get(i)) else {
            return Vec::new();
        };
        let bounds = [region.north, region.south, region.west, region.east];
        self.headers
            .iter()
            .zip(record)
            .map(|(header, value)| {
                match BOUND_COLUMNS.iter().position(|c| *c == header.as_str()) {
                    Some(k) => format_bound(bounds[k]),
                    None => value.clone(),
                }
            })
            .collect()
    }
}

fn parse_region(record: &StringRecord, indices: &[usize; 4], row: usize) -> Result<Region> {
    let mut bounds = [0.0f64; 4];
    for ((bound, &index), column) in bounds.iter_mut().zip(indices).zip(BOUND_COLUMNS) {
        let text = record.get(index).unwrap_or("");
        *bound = text.parse().map_err(|_| ExtractionError::InvalidBound {
            row,
            column,
            value: text.to_string(),
        })?;
    }
    let [north, south, west, east] = bounds;
    Ok(Region::new(north, south, west, east))
}

/// Format a bound the way spreadsheet users expect: `10.0`, `9.1234`.
fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_extra_columns() {
        let table = RegionTable::from_csv_str(
            "district,N,S,W,E,code\nZomba,-15.2,-15.6,35.2,35.5,MW07\nMzuzu,-11.3,-11.6,33.9,34.1,MW01\n",
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.headers(), &["district", "N", "S", "W", "E", "code"]);
        assert_eq!(table.regions()[1], Region::new(-11.3, -11.6, 33.9, 34.1));
        assert_eq!(
            table.output_record(0),
            vec!["Zomba", "-15.2", "-15.6", "35.2", "35.5", "MW07"]
        );
    }

    #[test]
    fn test_bounds_rounded_to_four_decimals() {
        let table = RegionTable::from_csv_str("N,S,W,E\n10.000049,9.00001,30,31.12346\n").unwrap();
        assert_eq!(table.regions()[0], Region::new(10.0, 9.0, 30.0, 31.1235));
        assert_eq!(table.output_record(0), vec!["10.0", "9.0", "30.0", "31.1235"]);
    }

    #[test]
    fn test_missing_column() {
        let result = RegionTable::from_csv_str("N,S,W\n1,0,0\n");
        assert!(matches!(result, Err(ExtractionError::MissingColumn("E"))));
    }

    #[test]
    fn test_non_numeric_bound() {
        let result = RegionTable::from_csv_str("N,S,W,E\n1,zero,0,1\n");
        assert!(matches!(
            result,
            Err(ExtractionError::InvalidBound { row: 1, column: "S", .. })
        ));
    }

    #[test]
    fn test_empty_table() {
        assert!(matches!(
            RegionTable::from_csv_str("N,S,W,E\n"),
            Err(ExtractionError::NoRegions)
        ));
    }
}
