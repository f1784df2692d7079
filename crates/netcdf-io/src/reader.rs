//! Lazy reader for gridded rainfall files.

use std::ops::Range;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use grid_processor::{GridProcessorError, GridSource, Window, WindowData};
use rfe_common::{CoordinateAxes, CoordinateAxis, Grid};

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{
    get_f32_attr, get_string_attr, offsets_to_dates, parse_time_units, read_1d_f64,
    silence_hdf5_errors,
};

/// Data variables probed, in order, when none is named explicitly.
pub const DATA_VARIABLES: &[&str] = &["rfe", "precip"];

const LAT_NAMES: &[&str] = &["lat", "latitude"];
const LON_NAMES: &[&str] = &["lon", "longitude"];

/// An open netCDF rainfall file.
///
/// Only metadata (axes, time, fill value) is read on open; cell values are
/// fetched per window, which keeps a year of 0.05° data off the heap.
pub struct NetCdfGridSource {
    path: PathBuf,
    file: netcdf::File,
    variable: String,
    axes: CoordinateAxes,
    dates: Vec<NaiveDate>,
    nt: usize,
    has_time_dim: bool,
    fill_value: f32,
}

impl NetCdfGridSource {
    /// Open `path`, picking `rfe` or `precip`, or failing that the only 3-D
    /// variable in the file.
    pub fn open(path: &Path) -> NetCdfResult<Self> {
        Self::open_with(path, None)
    }

    /// Open `path` reading the named data variable.
    pub fn open_variable(path: &Path, variable: &str) -> NetCdfResult<Self> {
        Self::open_with(path, Some(variable))
    }

    fn open_with(path: &Path, variable: Option<&str>) -> NetCdfResult<Self> {
        if !path.exists() {
            return Err(NetCdfError::FileNotFound(path.to_path_buf()));
        }
        silence_hdf5_errors();

        let file = netcdf::open(path)?;
        let variable = match variable {
            Some(name) => name.to_string(),
            None => find_data_variable(&file)?,
        };

        let axes = CoordinateAxes::new(
            CoordinateAxis::from_values(read_1d_f64(&file, LAT_NAMES)?),
            CoordinateAxis::from_values(read_1d_f64(&file, LON_NAMES)?),
        );

        let (nt, has_time_dim, fill_value) = {
            let var = file
                .variable(&variable)
                .ok_or_else(|| NetCdfError::MissingData(format!("{variable} variable")))?;
            let dims = var.dimensions();
            let (nt, has_time_dim, ny, nx) = match dims {
                [t, y, x] => (t.len(), true, y.len(), x.len()),
                [y, x] => (1, false, y.len(), x.len()),
                _ => {
                    return Err(NetCdfError::InvalidFormat(format!(
                        "{variable} has {} dimensions, expected (time, lat, lon)",
                        dims.len()
                    )))
                }
            };
            if ny != axes.ny() || nx != axes.nx() {
                return Err(NetCdfError::InvalidFormat(format!(
                    "{variable} is {ny}x{nx} but axes are {}x{}",
                    axes.ny(),
                    axes.nx()
                )));
            }
            let fill_value = get_f32_attr(&var, "_FillValue")
                .or_else(|| get_f32_attr(&var, "missing_value"))
                .unwrap_or(f32::NAN);
            (nt, has_time_dim, fill_value)
        };

        let dates = read_dates(&file)?;
        if !dates.is_empty() && dates.len() != nt {
            return Err(NetCdfError::InvalidFormat(format!(
                "time axis has {} values but {variable} has {nt} steps",
                dates.len()
            )));
        }

        debug!(
            path = %path.display(),
            variable = %variable,
            nt = nt,
            ny = axes.ny(),
            nx = axes.nx(),
            "Opened netCDF grid"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            variable,
            axes,
            dates,
            nt,
            has_time_dim,
            fill_value,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn variable_name(&self) -> &str {
        &self.variable
    }

    /// Calendar date of each time step. Empty when the file has no time axis.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Stored fill value, NaN when the variable declares none.
    pub fn fill_value(&self) -> f32 {
        self.fill_value
    }

    /// Read every time step into memory. Fill cells become NaN.
    pub fn read_grid(&self) -> NetCdfResult<Grid> {
        let window = Window::new(0..self.axes.ny(), 0..self.axes.nx());
        let values = self.read_values(0..self.nt, &window)?;
        Ok(Grid::new(values, self.nt, self.axes.clone(), self.fill_value)?)
    }

    fn read_values(&self, times: Range<usize>, window: &Window) -> NetCdfResult<Vec<f32>> {
        if times.is_empty() || window.is_empty() {
            return Ok(Vec::new());
        }
        let var = self
            .file
            .variable(&self.variable)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", self.variable)))?;

        let mut values: Vec<f32> = if self.has_time_dim {
            var.get_values::<f32, _>((times, window.rows.clone(), window.cols.clone()))?
        } else {
            var.get_values::<f32, _>((window.rows.clone(), window.cols.clone()))?
        };

        let fill = self.fill_value;
        if !fill.is_nan() {
            values
                .iter_mut()
                .filter(|v| **v == fill)
                .for_each(|v| *v = f32::NAN);
        }
        Ok(values)
    }
}

impl GridSource for NetCdfGridSource {
    fn axes(&self) -> &CoordinateAxes {
        &self.axes
    }

    fn time_len(&self) -> usize {
        self.nt
    }

    fn read_window(
        &self,
        times: Range<usize>,
        window: &Window,
    ) -> grid_processor::Result<WindowData> {
        if times.end > self.nt || !window.fits(self.axes.ny(), self.axes.nx()) {
            return Err(GridProcessorError::out_of_bounds(
                format!("times {times:?}, {window:?}"),
                format!("{} steps of {}x{}", self.nt, self.axes.ny(), self.axes.nx()),
            ));
        }
        let nt = times.len();
        let values = self.read_values(times, window).map_err(|e| {
            GridProcessorError::read_failed(format!("{}: {e}", self.path.display()))
        })?;
        Ok(WindowData {
            values,
            nt,
            fill_value: self.fill_value,
        })
    }
}

fn find_data_variable(file: &netcdf::File) -> NetCdfResult<String> {
    if let Some(name) = DATA_VARIABLES
        .iter()
        .find(|name| file.variable(name).is_some())
    {
        return Ok(name.to_string());
    }

    let mut three_d = file
        .variables()
        .filter(|var| var.dimensions().len() == 3)
        .map(|var| var.name());
    match (three_d.next(), three_d.next()) {
        (Some(name), None) => Ok(name),
        _ => Err(NetCdfError::MissingData(format!(
            "data variable (tried {} and a single 3-D variable)",
            DATA_VARIABLES.join(", ")
        ))),
    }
}

fn read_dates(file: &netcdf::File) -> NetCdfResult<Vec<NaiveDate>> {
    let Some(var) = file.variable("time") else {
        return Ok(Vec::new());
    };
    let units = get_string_attr(&var, "units")
        .ok_or_else(|| NetCdfError::InvalidTime("time variable has no units".to_string()))?;
    let (unit, base) = parse_time_units(&units)?;
    let offsets = var.get_values::<f64, _>(..)?;
    offsets_to_dates(unit, base, &offsets)
}
