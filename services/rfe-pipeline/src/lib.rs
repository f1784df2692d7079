//! Regional rainfall pipeline.
//!
//! Retrieves ARC2 or CHIRPS files for a date range, converts ARC2 binaries
//! to netCDF and writes per-region area-mean time series as CSV.

pub mod config;
pub mod download;
pub mod pipeline;

pub use config::{ConfigFile, ConfigOverrides, DownloadSettings, PipelineConfig};
pub use download::{
    remote_files, DownloadConfig, DownloadManager, DownloadOutcome, DownloadReport, RemoteFile,
    RetrievalError,
};
pub use pipeline::{Pipeline, PipelineReport, Stages};
