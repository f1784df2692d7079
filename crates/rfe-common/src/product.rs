//! Supported rainfall-estimate products.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CommonError;
use crate::filename::{DateKey, FilenamePattern};
use crate::grid::GridGeometry;
use crate::time::DateRangePolicy;

/// ARC2 daily binary source: `daily_clim.bin.YYYYMMDD[.gz]`.
pub const ARC2_BINARY: FilenamePattern =
    FilenamePattern::new("daily_clim.bin.", DateKey::Day, "").with_compressed_suffix(".gz");

/// ARC2 daily file after conversion: `arc2.0_YYYYMMDD_0.10.nc`.
pub const ARC2_NETCDF: FilenamePattern = FilenamePattern::new("arc2.0_", DateKey::Day, "_0.10.nc");

/// CHIRPS yearly stack: `chirps-v2.0.YYYY.days_p05.nc`.
pub const CHIRPS_YEARLY: FilenamePattern =
    FilenamePattern::new("chirps-v2.0.", DateKey::Year, ".days_p05.nc");

/// How a product's gridded source files are organised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLayout {
    /// One file per day, one time step per file.
    DailyFiles,
    /// One file per calendar year, one time step per day of the year.
    YearlyFiles,
}

/// A rainfall product variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    /// NOAA CPC African Rainfall Climatology v2.0 (binary, converted to netCDF)
    Arc2,
    /// CHC CHIRPS v2.0 daily, 0.05° yearly netCDF stacks
    Chirps,
}

impl Product {
    /// Tag used in converted and output filenames.
    pub fn tag(&self) -> &'static str {
        match self {
            Product::Arc2 => "arc2.0",
            Product::Chirps => "chirps-v2.0",
        }
    }

    pub fn geometry(&self) -> GridGeometry {
        match self {
            Product::Arc2 => GridGeometry::arc2(),
            Product::Chirps => GridGeometry::chirps_p05(),
        }
    }

    pub fn layout(&self) -> SourceLayout {
        match self {
            Product::Arc2 => SourceLayout::DailyFiles,
            Product::Chirps => SourceLayout::YearlyFiles,
        }
    }

    pub fn date_policy(&self) -> DateRangePolicy {
        match self {
            Product::Arc2 => DateRangePolicy::ExclusiveDailyRange,
            Product::Chirps => DateRangePolicy::InclusiveYearRange,
        }
    }

    /// Archive the raw files are fetched from.
    pub fn default_remote_url(&self) -> &'static str {
        match self {
            Product::Arc2 => "https://ftp.cpc.ncep.noaa.gov/fews/fewsdata/africa/arc2/bin",
            Product::Chirps => {
                "https://data.chc.ucsb.edu/products/CHIRPS-2.0/global_daily/netcdf/p05"
            }
        }
    }

    /// Pattern of the files fetched from the remote archive.
    pub fn remote_pattern(&self) -> FilenamePattern {
        match self {
            Product::Arc2 => ARC2_BINARY,
            Product::Chirps => CHIRPS_YEARLY,
        }
    }

    /// Pattern of the netCDF files extraction reads.
    pub fn gridded_pattern(&self) -> FilenamePattern {
        match self {
            Product::Arc2 => ARC2_NETCDF,
            Product::Chirps => CHIRPS_YEARLY,
        }
    }

    /// True when raw files must be converted to netCDF before extraction.
    pub fn needs_conversion(&self) -> bool {
        matches!(self, Product::Arc2)
    }

    /// Name of the rainfall variable inside the gridded files.
    pub fn data_variable(&self) -> &'static str {
        match self {
            Product::Arc2 => "rfe",
            Product::Chirps => "precip",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Product::Arc2 => write!(f, "arc2"),
            Product::Chirps => write!(f, "chirps"),
        }
    }
}

impl FromStr for Product {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arc2" | "arc2.0" | "arc" => Ok(Product::Arc2),
            "chirps" | "chirps-v2.0" | "chirps_p05" => Ok(Product::Chirps),
            other => Err(CommonError::UnknownProduct(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_from_str() {
        assert_eq!("ARC2".parse::<Product>().unwrap(), Product::Arc2);
        assert_eq!("chirps".parse::<Product>().unwrap(), Product::Chirps);
        assert!("tamsat".parse::<Product>().is_err());
    }

    #[test]
    fn test_arc2_filenames() {
        let date = NaiveDate::from_ymd_opt(2021, 5, 20).unwrap();
        assert_eq!(ARC2_NETCDF.format_day(date), "arc2.0_20210520_0.10.nc");
        assert_eq!(
            Product::Arc2.remote_pattern().format_day_compressed(date),
            "daily_clim.bin.20210520.gz"
        );
    }

    #[test]
    fn test_policies_differ() {
        assert_eq!(
            Product::Arc2.date_policy(),
            DateRangePolicy::ExclusiveDailyRange
        );
        assert_eq!(
            Product::Chirps.date_policy(),
            DateRangePolicy::InclusiveYearRange
        );
    }
}
