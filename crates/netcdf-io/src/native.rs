//! Low-level helpers around the netcdf library.

use std::sync::Once;

use chrono::{Duration, NaiveDate};

use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints diagnostics even for errors the Rust side
/// handles, such as probing for an optional `missing_value` attribute:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// Call once early in `main()`, before any netCDF file is opened. Safe to call
/// repeatedly.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe; null handlers disable printing.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Check if a variable has an attribute with the given name.
pub(crate) fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

pub(crate) fn get_f32_attr(var: &netcdf::Variable, name: &str) -> Option<f32> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f32::try_from(attr_value).ok()
}

pub(crate) fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    String::try_from(attr_value).ok()
}

/// Read a 1-D variable as `f64`, trying each alias in order.
pub(crate) fn read_1d_f64(file: &netcdf::File, aliases: &[&str]) -> NetCdfResult<Vec<f64>> {
    for &alias in aliases {
        if let Some(var) = file.variable(alias) {
            return Ok(var.get_values::<f64, _>(..)?);
        }
    }
    Err(NetCdfError::MissingData(format!(
        "coordinate variable (tried {})",
        aliases.join(", ")
    )))
}

/// Unit of a CF time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Days,
    Hours,
}

/// Parse CF time units such as `days since 2021-06-01 0:0:0` or
/// `days since 1980-1-1 0:0:0`.
pub fn parse_time_units(units: &str) -> NetCdfResult<(TimeUnit, NaiveDate)> {
    let mut parts = units.split_whitespace();
    let unit = match parts.next() {
        Some("days") => TimeUnit::Days,
        Some("hours") => TimeUnit::Hours,
        _ => {
            return Err(NetCdfError::InvalidTime(format!(
                "unsupported time units '{units}'"
            )))
        }
    };
    if parts.next() != Some("since") {
        return Err(NetCdfError::InvalidTime(format!(
            "unexpected time units format '{units}'"
        )));
    }

    let date_part = parts
        .next()
        .and_then(|s| s.split('T').next())
        .ok_or_else(|| NetCdfError::InvalidTime(format!("no reference date in '{units}'")))?;
    let base = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| {
        NetCdfError::InvalidTime(format!("failed to parse reference date '{date_part}': {e}"))
    })?;

    Ok((unit, base))
}

/// Offsets beyond this many days from the reference date are rejected.
/// Fill values on an unlimited time axis land far outside it.
const MAX_OFFSET_DAYS: f64 = 1.0e7;

/// Convert time offsets to calendar dates. Fractional offsets are floored to
/// the day they fall in.
pub fn offsets_to_dates(
    unit: TimeUnit,
    base: NaiveDate,
    offsets: &[f64],
) -> NetCdfResult<Vec<NaiveDate>> {
    offsets
        .iter()
        .map(|&offset| {
            let days = match unit {
                TimeUnit::Days => offset.floor(),
                TimeUnit::Hours => (offset / 24.0).floor(),
            };
            if !days.is_finite() || days.abs() > MAX_OFFSET_DAYS {
                return Err(NetCdfError::InvalidTime(format!(
                    "time offset {offset} out of range"
                )));
            }
            let days = days as i64;
            Duration::try_days(days)
                .and_then(|delta| base.checked_add_signed(delta))
                .ok_or_else(|| {
                    NetCdfError::InvalidTime(format!("date overflow adding {days} days to {base}"))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_units_padded_and_unpadded() {
        let (unit, base) = parse_time_units("days since 2021-06-01 0:0:0").unwrap();
        assert_eq!(unit, TimeUnit::Days);
        assert_eq!(base, NaiveDate::from_ymd_opt(2021, 6, 1).unwrap());

        let (_, base) = parse_time_units("days since 1980-1-1 0:0:0").unwrap();
        assert_eq!(base, NaiveDate::from_ymd_opt(1980, 1, 1).unwrap());

        let (unit, _) = parse_time_units("hours since 2000-01-01T00:00:00").unwrap();
        assert_eq!(unit, TimeUnit::Hours);
    }

    #[test]
    fn test_parse_time_units_rejects_other_formats() {
        assert!(parse_time_units("seconds since 2000-01-01").is_err());
        assert!(parse_time_units("days after 2000-01-01").is_err());
        assert!(parse_time_units("days since").is_err());
    }

    #[test]
    fn test_offsets_to_dates() {
        let base = NaiveDate::from_ymd_opt(1980, 1, 1).unwrap();
        let dates = offsets_to_dates(TimeUnit::Days, base, &[0.0, 1.5, 366.0]).unwrap();
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(1980, 1, 2).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(1981, 1, 1).unwrap());

        let dates = offsets_to_dates(TimeUnit::Hours, base, &[48.0]).unwrap();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(1980, 1, 3).unwrap());
    }

    #[test]
    fn test_offsets_to_dates_rejects_fill_and_non_finite() {
        let base = NaiveDate::from_ymd_opt(2021, 12, 29).unwrap();
        assert!(offsets_to_dates(TimeUnit::Days, base, &[9.969209968386869e36]).is_err());
        assert!(offsets_to_dates(TimeUnit::Days, base, &[0.0, f64::NAN]).is_err());
        assert!(offsets_to_dates(TimeUnit::Hours, base, &[f64::INFINITY]).is_err());
        assert!(offsets_to_dates(TimeUnit::Days, base, &[-1.0e12]).is_err());
    }
}
