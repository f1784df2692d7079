//! Region × date tables of area-mean rainfall.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::NaiveDate;
use csv::Writer;

use crate::regions::RegionTable;

/// Rendered in place of a value when a region has no valid cells.
pub const MISSING: &str = "nan";

/// Layout of the written table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// One row per region (input columns first), one `YYYYMMDD` column per
    /// date.
    RegionsByDate,
    /// One row per `YYYY-MM-DD` date, one column per region index.
    DatesByRegion,
}

/// Area-mean values keyed by date, one value per region.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    orientation: Orientation,
    region_count: usize,
    series: BTreeMap<NaiveDate, Vec<f64>>,
}

impl TimeSeriesTable {
    pub fn new(orientation: Orientation, region_count: usize) -> Self {
        Self {
            orientation,
            region_count,
            series: BTreeMap::new(),
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn region_count(&self) -> usize {
        self.region_count
    }

    /// Set the values for `date`. Short inputs are padded with NaN and long
    /// ones truncated to the region count.
    pub fn insert(&mut self, date: NaiveDate, mut values: Vec<f64>) {
        values.resize(self.region_count, f64::NAN);
        self.series.insert(date, values);
    }

    /// Mark every region missing on `date`.
    pub fn insert_missing(&mut self, date: NaiveDate) {
        self.insert(date, Vec::new());
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.series.contains_key(&date)
    }

    /// Dates present, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.series.keys().copied()
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn value(&self, region: usize, date: NaiveDate) -> Option<f64> {
        self.series.get(&date)?.get(region).copied()
    }

    /// Header and data rows as strings, in the table's orientation.
    pub fn rows(&self, regions: &RegionTable) -> (Vec<String>, Vec<Vec<String>>) {
        match self.orientation {
            Orientation::RegionsByDate => {
                let mut header = regions.headers().to_vec();
                header.extend(self.dates().map(|d| d.format("%Y%m%d").to_string()));

                let rows = (0..self.region_count)
                    .map(|i| {
                        let mut row = regions.output_record(i);
                        row.extend(self.series.values().map(|v| format_value(v[i])));
                        row
                    })
                    .collect();
                (header, rows)
            }
            Orientation::DatesByRegion => {
                let mut header = vec!["date".to_string()];
                header.extend((0..self.region_count).map(|i| i.to_string()));

                let rows = self
                    .series
                    .iter()
                    .map(|(date, values)| {
                        let mut row = vec![date.format("%Y-%m-%d").to_string()];
                        row.extend(values.iter().map(|v| format_value(*v)));
                        row
                    })
                    .collect();
                (header, rows)
            }
        }
    }

    /// Write the table as CSV.
    pub fn write_csv<W: Write>(&self, regions: &RegionTable, out: W) -> csv::Result<()> {
        let (header, rows) = self.rows(regions);
        let mut writer = Writer::from_writer(out);
        writer.write_record(&header)?;
        for row in rows {
            writer.write_record(&row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// One decimal place, or [`MISSING`].
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        MISSING.to_string()
    } else {
        format!("{value:.1}")
    }
}
