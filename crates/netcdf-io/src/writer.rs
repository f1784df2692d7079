//! CF-compliant netCDF-4 writer for daily rainfall grids.

use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use rfe_common::{CoordinateAxis, Grid, SENTINEL};

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::silence_hdf5_errors;

/// Descriptive attributes written into each file.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderMetadata {
    pub title: String,
    pub institution: String,
    pub history: String,
    pub conventions: String,
    /// Data variable name (also its `short_name`)
    pub variable: String,
    pub long_name: String,
    pub units: String,
    /// Local time at which the accumulation day starts
    pub day_begins: String,
}

impl EncoderMetadata {
    /// Attributes for ARC2 grids converted from the binary archive.
    pub fn arc2() -> Self {
        Self {
            title: "ARC Rainfall Estimate - Version 2.0".to_string(),
            institution: "NOAA".to_string(),
            history: "Converted from binary format to netCDF".to_string(),
            conventions: "CF-1.7".to_string(),
            variable: "rfe".to_string(),
            long_name: "Rainfall Estimate".to_string(),
            units: "mm".to_string(),
            day_begins: "06:00".to_string(),
        }
    }
}

/// Writes [`Grid`]s as compressed netCDF-4 files with a `(time, lat, lon)`
/// data variable.
#[derive(Debug, Clone)]
pub struct GridEncoder {
    metadata: EncoderMetadata,
    compression_level: i32,
    fill_value: f32,
}

impl GridEncoder {
    pub fn new(metadata: EncoderMetadata) -> Self {
        Self {
            metadata,
            compression_level: 9,
            fill_value: SENTINEL,
        }
    }

    pub fn arc2() -> Self {
        Self::new(EncoderMetadata::arc2())
    }

    /// Deflate level, clamped to 0..=9.
    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level.clamp(0, 9);
        self
    }

    pub fn metadata(&self) -> &EncoderMetadata {
        &self.metadata
    }

    /// Write `grid` to `dest`.
    ///
    /// The time axis counts days since `start`. A single-step grid gets one
    /// offset, `end - start`; a stacked grid must have one step per day of
    /// `start..=end`. Missing cells (NaN or the grid's own fill value) are
    /// written as the encoder's fill value.
    pub fn encode(
        &self,
        grid: &Grid,
        start: NaiveDate,
        end: NaiveDate,
        dest: &Path,
    ) -> NetCdfResult<()> {
        let span = (end - start).num_days();
        let offsets: Vec<i32> = if grid.nt() == 1 {
            vec![span as i32]
        } else {
            (0..=span as i32).collect()
        };
        if span < 0 || offsets.len() != grid.nt() {
            return Err(NetCdfError::InvalidTime(format!(
                "{} time steps do not cover {start}..={end}",
                grid.nt()
            )));
        }

        silence_hdf5_errors();
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let axes = grid.axes();
        let mut file = netcdf::create(dest)?;
        file.add_unlimited_dimension("time")?;
        file.add_dimension("lat", axes.ny())?;
        file.add_dimension("lon", axes.nx())?;

        {
            let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
            lon_var.set_compression(self.compression_level, false)?;
            lon_var.put_attribute("units", "degrees_east")?;
            lon_var.put_attribute("standard_name", "longitude")?;
            lon_var.put_attribute("long_name", "longitude")?;
            lon_var.put_attribute("axis", "X")?;
            lon_var.put_values(axes.lon.values(), ..)?;
        }

        {
            let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
            lat_var.set_compression(self.compression_level, false)?;
            lat_var.put_attribute("units", "degrees_north")?;
            lat_var.put_attribute("standard_name", "latitude")?;
            lat_var.put_attribute("long_name", "latitude")?;
            lat_var.put_attribute("axis", "Y")?;
            lat_var.put_values(axes.lat.values(), ..)?;
        }

        {
            let mut time_var = file.add_variable::<i32>("time", &["time"])?;
            time_var.set_compression(self.compression_level, false)?;
            time_var.put_attribute(
                "units",
                format!("days since {} 0:0:0", start.format("%Y-%m-%d")).as_str(),
            )?;
            time_var.put_attribute("long_name", "time")?;
            time_var.put_attribute("day_begins", self.metadata.day_begins.as_str())?;
            time_var.put_attribute("calendar", "standard")?;
            time_var.put_attribute("axis", "T")?;
            for (t, offset) in offsets.iter().enumerate() {
                time_var.put_value(*offset, [t])?;
            }
        }

        {
            let mut data_var =
                file.add_variable::<f32>(&self.metadata.variable, &["time", "lat", "lon"])?;
            data_var.set_compression(self.compression_level, false)?;
            data_var.put_attribute("_FillValue", self.fill_value)?;
            data_var.put_attribute("units", self.metadata.units.as_str())?;
            data_var.put_attribute("long_name", self.metadata.long_name.as_str())?;
            data_var.put_attribute("short_name", self.metadata.variable.as_str())?;

            for t in 0..grid.nt() {
                let step = grid
                    .time_slice(t)
                    .ok_or_else(|| NetCdfError::InvalidFormat(format!("missing time step {t}")))?;
                let values: Vec<f32> = step
                    .iter()
                    .map(|&v| if grid.is_missing(v) { self.fill_value } else { v })
                    .collect();
                data_var.put_values(&values, (t, .., ..))?;
            }
        }

        file.add_attribute("title", self.metadata.title.as_str())?;
        file.add_attribute("institution", self.metadata.institution.as_str())?;
        file.add_attribute("Conventions", self.metadata.conventions.as_str())?;
        file.add_attribute("history", self.metadata.history.as_str())?;
        add_extent_attributes(&mut file, "lat", &axes.lat)?;
        add_extent_attributes(&mut file, "lon", &axes.lon)?;

        drop(file);
        set_world_readable(dest)?;

        info!(
            file = %dest.display(),
            steps = grid.nt(),
            "Created netCDF file"
        );
        Ok(())
    }
}

impl Default for GridEncoder {
    fn default() -> Self {
        Self::arc2()
    }
}

/// `<prefix>min`, `<prefix>max` and `<prefix>res` global attributes.
fn add_extent_attributes(
    file: &mut netcdf::FileMut,
    prefix: &str,
    axis: &CoordinateAxis,
) -> NetCdfResult<()> {
    let (Some(min), Some(max)) = (axis.min(), axis.max()) else {
        return Ok(());
    };
    file.add_attribute(&format!("{prefix}min"), min)?;
    file.add_attribute(&format!("{prefix}max"), max)?;
    if axis.len() > 1 {
        let res = (max - min) / (axis.len() - 1) as f64;
        file.add_attribute(&format!("{prefix}res"), res)?;
    }
    Ok(())
}

#[cfg(unix)]
fn set_world_readable(path: &Path) -> NetCdfResult<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_world_readable(_path: &Path) -> NetCdfResult<()> {
    Ok(())
}
