//! Pipeline configuration.
//!
//! Values come from an optional YAML file and are then overridden field by
//! field from the command line or environment. The merged result is
//! validated once and passed by value to each stage.
//!
//! ```yaml
//! product: arc2
//! start_date: 2021-05-20
//! end_date: 2021-05-22
//! tag: ethiopia
//! data_dir: /data/rfe
//! regions_file: config/regions.csv
//! download:
//!   max_concurrent: 4
//!   max_retries: 3
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use extraction::ExtractionRequest;
use rfe_common::{DateRange, DateRangePolicy, Product};
use storage::DataLayout;

use crate::download::DownloadConfig;

/// Retrieval settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Transfers in flight at once
    pub max_concurrent: usize,
    /// Retries after the first failed attempt
    pub max_retries: u32,
    pub initial_retry_delay_secs: u64,
    pub max_retry_delay_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            max_retries: 3,
            initial_retry_delay_secs: 2,
            max_retry_delay_secs: 60,
            request_timeout_secs: 300,
        }
    }
}

impl From<&DownloadSettings> for DownloadConfig {
    fn from(settings: &DownloadSettings) -> Self {
        Self {
            max_concurrent: settings.max_concurrent,
            max_retries: settings.max_retries,
            initial_retry_delay: Duration::from_secs(settings.initial_retry_delay_secs),
            max_retry_delay: Duration::from_secs(settings.max_retry_delay_secs),
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
        }
    }
}

/// Contents of a YAML config file. Every field is optional so that a file
/// may hold only defaults shared between runs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub product: Option<Product>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub tag: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub regions_file: Option<PathBuf>,
    pub remote_url: Option<String>,
    pub download: DownloadSettings,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub product: Option<Product>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub tag: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub regions_file: Option<PathBuf>,
    pub remote_url: Option<String>,
    pub max_concurrent: Option<usize>,
    pub max_retries: Option<u32>,
}

/// Validated configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub product: Product,
    pub range: DateRange,
    pub tag: String,
    pub data_dir: PathBuf,
    pub regions_file: PathBuf,
    pub remote_url: String,
    pub download: DownloadSettings,
}

impl PipelineConfig {
    /// Merge `file` and `overrides` (overrides win) and validate.
    pub fn resolve(file: ConfigFile, overrides: ConfigOverrides) -> Result<Self> {
        let product = overrides.product.or(file.product).unwrap_or(Product::Arc2);

        let Some(start) = overrides.start_date.or(file.start_date) else {
            bail!("start_date is required");
        };
        let Some(end) = overrides.end_date.or(file.end_date) else {
            bail!("end_date is required");
        };
        match product.date_policy() {
            DateRangePolicy::ExclusiveDailyRange if start >= end => {
                bail!("start_date {start} must be before end_date {end}");
            }
            DateRangePolicy::InclusiveYearRange if start > end => {
                bail!("start_date {start} must not be after end_date {end}");
            }
            _ => {}
        }
        let range = DateRange::new(start, end)?;

        let Some(tag) = overrides.tag.or(file.tag) else {
            bail!("tag is required");
        };
        if tag.is_empty() || tag.contains(['/', '\\']) {
            bail!("tag '{tag}' must be a non-empty file name fragment");
        }

        let Some(data_dir) = overrides.data_dir.or(file.data_dir) else {
            bail!("data_dir is required");
        };
        let Some(regions_file) = overrides.regions_file.or(file.regions_file) else {
            bail!("regions_file is required");
        };

        let remote_url = overrides
            .remote_url
            .or(file.remote_url)
            .unwrap_or_else(|| product.default_remote_url().to_string());

        let mut download = file.download;
        if let Some(n) = overrides.max_concurrent {
            download.max_concurrent = n;
        }
        if let Some(n) = overrides.max_retries {
            download.max_retries = n;
        }
        if download.max_concurrent == 0 {
            bail!("download.max_concurrent must be at least 1");
        }

        let config = Self {
            product,
            range,
            tag,
            data_dir,
            regions_file,
            remote_url,
            download,
        };
        debug!(?config, "Resolved configuration");
        Ok(config)
    }

    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.data_dir)
    }

    pub fn extraction_request(&self) -> ExtractionRequest {
        ExtractionRequest {
            product: self.product,
            range: self.range,
            regions_file: self.regions_file.clone(),
            layout: self.layout(),
            tag: self.tag.clone(),
        }
    }
}
