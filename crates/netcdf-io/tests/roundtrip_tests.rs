//! Write/read round trips through real netCDF files.

use chrono::NaiveDate;
use grid_processor::{GridSource, RegionAggregator, Window};
use netcdf_io::{GridEncoder, NetCdfError, NetCdfGridSource};
use rfe_common::{CoordinateAxes, CoordinateAxis, Grid, GridGeometry, Region, SENTINEL};
use test_utils::{assert_approx_eq, assert_nan, create_rainfall_grid, temp_test_dir};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn small_geometry() -> GridGeometry {
    GridGeometry {
        nx: 6,
        ny: 4,
        lon_min: 30.0,
        lon_max: 30.5,
        lat_min: -1.0,
        lat_max: -0.7,
    }
}

// ============================================================================
// Encoder → reader
// ============================================================================

#[test]
fn test_single_day_round_trip_preserves_values() {
    let dir = temp_test_dir();
    let dest = dir.path().join("netcdf/2021/06/arc2.0_20210601_0.10.nc");

    let geometry = small_geometry();
    let mut values = create_rainfall_grid(geometry.nx, geometry.ny, 3);
    values[5] = SENTINEL;
    let grid = Grid::single(values.clone(), geometry.axes(), SENTINEL).unwrap();

    let day = date(2021, 6, 1);
    GridEncoder::arc2().encode(&grid, day, day, &dest).unwrap();

    let source = NetCdfGridSource::open(&dest).unwrap();
    assert_eq!(source.variable_name(), "rfe");
    assert_eq!(source.dates(), &[day]);
    assert_eq!(source.fill_value(), SENTINEL);

    let read = source.read_grid().unwrap();
    assert_eq!(read.nt(), 1);
    for (i, (got, want)) in read.data().iter().zip(&values).enumerate() {
        if i == 5 {
            assert_nan!(*got);
        } else {
            assert_eq!(got, want);
        }
    }
    assert_approx_eq!(read.axes().lat.values()[3], -0.7, 1e-9);
}

#[test]
fn test_stacked_grid_time_axis() {
    let dir = temp_test_dir();
    let dest = dir.path().join("stack.nc");
    let geometry = small_geometry();

    let days: Vec<Grid> = (0..3)
        .map(|seed| {
            Grid::single(
                create_rainfall_grid(geometry.nx, geometry.ny, seed),
                geometry.axes(),
                SENTINEL,
            )
            .unwrap()
        })
        .collect();
    let stacked = Grid::stack(&days).unwrap();

    GridEncoder::arc2()
        .encode(&stacked, date(2021, 2, 27), date(2021, 3, 1), &dest)
        .unwrap();

    let source = NetCdfGridSource::open(&dest).unwrap();
    assert_eq!(source.time_len(), 3);
    assert_eq!(
        source.dates(),
        &[date(2021, 2, 27), date(2021, 2, 28), date(2021, 3, 1)]
    );

    let window = source.read_window(1..3, &Window::new(0..1, 0..2)).unwrap();
    assert_eq!(window.nt, 2);
    assert_eq!(window.step(1), &days[2].data()[..2]);
}

#[test]
fn test_stacked_grid_length_must_match_dates() {
    let dir = temp_test_dir();
    let geometry = small_geometry();
    let stacked = Grid::new(vec![0.0; 2 * geometry.len()], 2, geometry.axes(), SENTINEL).unwrap();

    let result = GridEncoder::arc2().encode(
        &stacked,
        date(2021, 1, 1),
        date(2021, 1, 5),
        &dir.path().join("bad.nc"),
    );
    assert!(matches!(result, Err(NetCdfError::InvalidTime(_))));
}

#[cfg(unix)]
#[test]
fn test_output_is_world_readable() {
    use std::os::unix::fs::PermissionsExt;

    let dir = temp_test_dir();
    let dest = dir.path().join("perm.nc");
    let geometry = small_geometry();
    let grid = Grid::single(vec![1.0; geometry.len()], geometry.axes(), SENTINEL).unwrap();
    GridEncoder::arc2()
        .encode(&grid, date(2021, 6, 1), date(2021, 6, 1), &dest)
        .unwrap();

    let mode = std::fs::metadata(&dest).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}

#[test]
fn test_global_attributes() {
    let dir = temp_test_dir();
    let dest = dir.path().join("attrs.nc");
    let grid = Grid::single(
        vec![0.0; GridGeometry::arc2().len()],
        GridGeometry::arc2().axes(),
        SENTINEL,
    )
    .unwrap();
    GridEncoder::arc2()
        .encode(&grid, date(2021, 6, 1), date(2021, 6, 1), &dest)
        .unwrap();

    let file = netcdf::open(&dest).unwrap();
    let text = |name: &str| -> String {
        file.attribute(name)
            .unwrap()
            .value()
            .unwrap()
            .try_into()
            .unwrap()
    };
    let number = |name: &str| -> f64 {
        file.attribute(name)
            .unwrap()
            .value()
            .unwrap()
            .try_into()
            .unwrap()
    };

    assert_eq!(text("Conventions"), "CF-1.7");
    assert_eq!(text("title"), "ARC Rainfall Estimate - Version 2.0");
    assert_eq!(number("latmin"), -40.0);
    assert_eq!(number("lonmax"), 55.0);
    assert_approx_eq!(number("latres"), 0.1, 1e-12);

    let time = file.variable("time").unwrap();
    let units: String = time.attribute_value("units").unwrap().unwrap().try_into().unwrap();
    assert_eq!(units, "days since 2021-06-01 0:0:0");
}

// ============================================================================
// Yearly files as written by the CHIRPS archive
// ============================================================================

/// Three days of `precip` on float time offsets from 1980-1-1.
fn write_yearly_file(path: &std::path::Path, axes: &CoordinateAxes) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("longitude", axes.nx()).unwrap();
    file.add_dimension("latitude", axes.ny()).unwrap();
    file.add_unlimited_dimension("time").unwrap();
    {
        let mut var = file.add_variable::<f32>("longitude", &["longitude"]).unwrap();
        let lon: Vec<f32> = axes.lon.values().iter().map(|v| *v as f32).collect();
        var.put_values(&lon, ..).unwrap();
    }
    {
        let mut var = file.add_variable::<f32>("latitude", &["latitude"]).unwrap();
        let lat: Vec<f32> = axes.lat.values().iter().map(|v| *v as f32).collect();
        var.put_values(&lat, ..).unwrap();
    }
    {
        let mut var = file.add_variable::<f32>("time", &["time"]).unwrap();
        var.put_attribute("units", "days since 1980-1-1 0:0:0").unwrap();
        // 2021-01-01 is day 14976
        for (t, offset) in [14976.0f32, 14977.0, 14978.0].iter().enumerate() {
            var.put_value(*offset, [t]).unwrap();
        }
    }
    {
        let mut var = file
            .add_variable::<f32>("precip", &["time", "latitude", "longitude"])
            .unwrap();
        var.put_attribute("missing_value", -9999.0f32).unwrap();
        let step = axes.ny() * axes.nx();
        for t in 0..3 {
            let mut values = vec![(t + 1) as f32; step];
            values[0] = -9999.0;
            var.put_values(&values, (t, .., ..)).unwrap();
        }
    }
}

#[test]
fn test_yearly_file_windowed_aggregation() {
    let dir = temp_test_dir();
    let path = dir.path().join("chirps-v2.0.2021.days_p05.nc");
    let axes = CoordinateAxes::new(
        CoordinateAxis::linspace(-0.975, -0.775, 5),
        CoordinateAxis::linspace(30.025, 30.225, 5),
    );
    write_yearly_file(&path, &axes);

    let source = NetCdfGridSource::open(&path).unwrap();
    assert_eq!(source.variable_name(), "precip");
    assert_eq!(source.dates()[0], date(2021, 1, 1));
    assert_eq!(source.dates()[2], date(2021, 1, 3));

    let whole = Region::new(0.0, -1.0, 30.0, 30.25);
    let means = RegionAggregator::new().aggregate(&source, &whole).unwrap();
    assert_eq!(means, vec![1.0, 2.0, 3.0]);

    // Only the missing corner cell: missing, not the sentinel.
    let corner = Region::new(-0.975, -0.975, 30.025, 30.025);
    let means = RegionAggregator::new().aggregate(&source, &corner).unwrap();
    assert!(means.iter().all(|v| v.is_nan()));
}

#[test]
fn test_open_missing_file() {
    let dir = temp_test_dir();
    let result = NetCdfGridSource::open(&dir.path().join("absent.nc"));
    assert!(matches!(result, Err(NetCdfError::FileNotFound(_))));
}

#[test]
fn test_open_garbage_file() {
    let dir = temp_test_dir();
    let path = dir.path().join("garbage.nc");
    std::fs::write(&path, b"definitely not netcdf").unwrap();
    assert!(NetCdfGridSource::open(&path).is_err());
}
