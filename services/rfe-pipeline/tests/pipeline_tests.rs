//! Convert and extract stages over a local data tree.

use std::path::Path;

use chrono::NaiveDate;
use rfe_common::{GridGeometry, Product};
use rfe_pipeline::{ConfigFile, ConfigOverrides, Pipeline, PipelineConfig, Stages};
use test_utils::{
    create_constant_grid, regions, temp_test_dir, write_binary_grid, write_binary_grid_gz,
    write_region_csv,
};

fn offline() -> Stages {
    Stages {
        download: false,
        ..Stages::default()
    }
}

fn config(root: &Path, start: (i32, u32, u32), end: (i32, u32, u32)) -> PipelineConfig {
    let overrides = ConfigOverrides {
        product: Some(Product::Arc2),
        start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2),
        end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2),
        tag: Some("offline".to_string()),
        data_dir: Some(root.to_path_buf()),
        regions_file: Some(root.join("regions.csv")),
        ..Default::default()
    };
    PipelineConfig::resolve(ConfigFile::default(), overrides).unwrap()
}

#[tokio::test]
async fn test_convert_then_extract() {
    let dir = temp_test_dir();
    let bin = dir.path().join("bin");
    let geometry = GridGeometry::arc2();
    write_binary_grid_gz(
        &bin.join("daily_clim.bin.20210520.gz"),
        &create_constant_grid(geometry.nx, geometry.ny, 2.0),
    );
    write_binary_grid(
        &bin.join("daily_clim.bin.20210521"),
        &create_constant_grid(geometry.nx, geometry.ny, 5.5),
    );
    write_region_csv(&dir.path().join("regions.csv"), &[("addis", regions::ADDIS)]);

    let pipeline = Pipeline::new(config(dir.path(), (2021, 5, 20), (2021, 5, 22)), offline());
    let report = pipeline.run().await.unwrap();

    let conversion = report.conversion.unwrap();
    assert_eq!(conversion.converted.len(), 2);
    assert!(conversion.is_clean());
    assert!(dir
        .path()
        .join("netcdf/2021/05/arc2.0_20210520_0.10.nc")
        .exists());
    // Sources stay as retrieved.
    assert!(bin.join("daily_clim.bin.20210520.gz").exists());

    let summary = report.extraction.unwrap();
    assert!(summary.created);
    let text = std::fs::read_to_string(&summary.path).unwrap();
    assert_eq!(
        text,
        "name,N,S,W,E,20210520,20210521\naddis,9.1,8.9,38.6,38.9,2.0,5.5\n"
    );

    // A second run converts nothing new.
    let again = pipeline.run().await.unwrap();
    assert!(again.conversion.unwrap().converted.is_empty());
}

#[tokio::test]
async fn test_conversion_failure_does_not_stop_extraction() {
    let dir = temp_test_dir();
    let geometry = GridGeometry::arc2();
    // No bin directory: conversion fails, extraction reads what is converted.
    let grid = rfe_common::Grid::single(
        create_constant_grid(geometry.nx, geometry.ny, 1.0),
        geometry.axes(),
        rfe_common::SENTINEL,
    )
    .unwrap();
    let day = NaiveDate::from_ymd_opt(2021, 5, 20).unwrap();
    netcdf_io::GridEncoder::arc2()
        .encode(
            &grid,
            day,
            day,
            &dir.path().join("netcdf/2021/05/arc2.0_20210520_0.10.nc"),
        )
        .unwrap();
    write_region_csv(&dir.path().join("regions.csv"), &[("addis", regions::ADDIS)]);

    let report = Pipeline::new(config(dir.path(), (2021, 5, 20), (2021, 5, 21)), offline())
        .run()
        .await
        .unwrap();
    assert!(report.conversion.is_none());
    assert!(report.extraction.unwrap().created);
}

#[tokio::test]
async fn test_extraction_failure_is_returned() {
    let dir = temp_test_dir();
    let result = Pipeline::new(config(dir.path(), (2021, 5, 20), (2021, 5, 21)), offline())
        .run()
        .await;
    assert!(result.is_err());
}
