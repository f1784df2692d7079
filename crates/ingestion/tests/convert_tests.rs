//! End-to-end conversion over a temporary data root.

use chrono::NaiveDate;
use ingestion::Converter;
use netcdf_io::NetCdfGridSource;
use storage::DataLayout;
use test_utils::{create_rainfall_grid, temp_test_dir, write_binary_grid, write_binary_grid_gz};

const NX: usize = 751;
const NY: usize = 801;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_convert_then_skip_on_second_run() {
    let dir = temp_test_dir();
    let layout = DataLayout::new(dir.path());
    let values = create_rainfall_grid(NX, NY, 11);
    write_binary_grid_gz(&layout.bin_dir().join("daily_clim.bin.20210601.gz"), &values);
    write_binary_grid(&layout.bin_dir().join("daily_clim.bin.20210602"), &values);

    let converter = Converter::new(layout.clone());
    let report = converter.run().unwrap();
    assert_eq!(report.converted.len(), 2);
    assert!(report.is_clean());

    let converted = layout.converted_path(date(2021, 6, 1));
    assert!(converted.exists());
    let source = NetCdfGridSource::open(&converted).unwrap();
    assert_eq!(source.dates(), &[date(2021, 6, 1)]);
    assert_eq!(source.read_grid().unwrap().data(), values.as_slice());

    // Sources are left in place
    assert!(layout.bin_dir().join("daily_clim.bin.20210601.gz").exists());

    let again = converter.run().unwrap();
    assert!(again.converted.is_empty());
    assert!(converter.plan().unwrap().is_empty());
}

#[test]
fn test_bad_source_does_not_stop_batch() {
    let dir = temp_test_dir();
    let layout = DataLayout::new(dir.path());
    write_binary_grid(&layout.bin_dir().join("daily_clim.bin.20210601"), &[1.0; 10]);
    write_binary_grid(
        &layout.bin_dir().join("daily_clim.bin.20210602"),
        &create_rainfall_grid(NX, NY, 2),
    );

    let report = Converter::new(layout.clone()).run().unwrap();
    assert_eq!(report.converted.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].0.ends_with("daily_clim.bin.20210601"));
    assert!(!layout.converted_path(date(2021, 6, 1)).exists());
}

#[test]
fn test_missing_bin_dir_fails_planning() {
    let dir = temp_test_dir();
    let converter = Converter::new(DataLayout::new(dir.path()));
    assert!(converter.run().is_err());
}
