//! Regional rainfall extraction pipeline.
//!
//! Runs three stages against a local data directory:
//! - Download of remote ARC2/CHIRPS files (skipping ones already present)
//! - Conversion of ARC2 binaries to netCDF (skipping converted dates)
//! - Extraction of per-region area means into a CSV table

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use rfe_common::Product;
use rfe_pipeline::{ConfigFile, ConfigOverrides, Pipeline, PipelineConfig, Stages};

#[derive(Parser, Debug)]
#[command(name = "rfe-pipeline")]
#[command(about = "Download, convert and extract regional rainfall time series")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "RFE_CONFIG")]
    config: Option<PathBuf>,

    /// Product: arc2 or chirps
    #[arg(long, env = "RFE_PRODUCT")]
    product: Option<Product>,

    /// First date, YYYY-MM-DD
    #[arg(long, env = "RFE_START_DATE")]
    start_date: Option<NaiveDate>,

    /// End date, YYYY-MM-DD (excluded for arc2)
    #[arg(long, env = "RFE_END_DATE")]
    end_date: Option<NaiveDate>,

    /// Suffix for the output file name
    #[arg(long, env = "RFE_TAG")]
    tag: Option<String>,

    /// Root of the local data tree
    #[arg(long, env = "RFE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// CSV with N, S, W, E columns
    #[arg(long, env = "RFE_REGIONS_FILE")]
    regions_file: Option<PathBuf>,

    /// Base URL of the remote archive
    #[arg(long, env = "RFE_REMOTE_URL")]
    remote_url: Option<String>,

    /// Maximum concurrent downloads
    #[arg(long)]
    max_concurrent: Option<usize>,

    /// Maximum retry attempts per download
    #[arg(long)]
    max_retries: Option<u32>,

    #[arg(long)]
    skip_download: bool,

    #[arg(long)]
    skip_convert: bool,

    #[arg(long)]
    skip_extract: bool,

    /// Log level
    #[arg(long, env = "RUST_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            product: self.product,
            start_date: self.start_date,
            end_date: self.end_date,
            tag: self.tag.clone(),
            data_dir: self.data_dir.clone(),
            regions_file: self.regions_file.clone(),
            remote_url: self.remote_url.clone(),
            max_concurrent: self.max_concurrent,
            max_retries: self.max_retries,
        }
    }

    fn stages(&self) -> Stages {
        Stages {
            download: !self.skip_download,
            convert: !self.skip_convert,
            extract: !self.skip_extract,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);
    if args.log_format.eq_ignore_ascii_case("json") {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    netcdf_io::silence_hdf5_errors();

    let file = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let config = PipelineConfig::resolve(file, args.overrides()).context("Invalid configuration")?;

    info!(
        product = %config.product,
        start = %config.range.start(),
        end = %config.range.end(),
        tag = %config.tag,
        data_dir = %config.data_dir.display(),
        "Starting rainfall pipeline"
    );

    let report = Pipeline::new(config, args.stages()).run().await?;

    if let Some(summary) = &report.extraction {
        println!("{summary}");
    }
    Ok(())
}
