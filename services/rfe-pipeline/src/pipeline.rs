//! Stage orchestration: download → convert → extract.

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use extraction::{run_extraction, RunSummary};
use ingestion::{ConversionReport, Converter};

use crate::config::PipelineConfig;
use crate::download::{remote_files, DownloadConfig, DownloadManager, DownloadReport};

/// Which stages to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stages {
    pub download: bool,
    pub convert: bool,
    pub extract: bool,
}

impl Default for Stages {
    fn default() -> Self {
        Self {
            download: true,
            convert: true,
            extract: true,
        }
    }
}

/// What each stage that ran produced.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub download: Option<DownloadReport>,
    pub conversion: Option<ConversionReport>,
    pub extraction: Option<RunSummary>,
}

/// One configured run of the pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    stages: Stages,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, stages: Stages) -> Self {
        Self { config, stages }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the enabled stages in order.
    ///
    /// A failed download or conversion stage is logged and the next stage
    /// still runs on whatever is on disk. A failed extraction is returned.
    pub async fn run(&self) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();

        if self.stages.download {
            match self.download().await {
                Ok(r) => report.download = Some(r),
                Err(e) => error!(error = %format!("{e:#}"), "Download stage failed"),
            }
        }

        if self.stages.convert && self.config.product.needs_conversion() {
            match self.convert().await {
                Ok(r) => report.conversion = Some(r),
                Err(e) => error!(error = %format!("{e:#}"), "Conversion stage failed"),
            }
        }

        if self.stages.extract {
            report.extraction = Some(self.extract().await?);
        }

        Ok(report)
    }

    async fn download(&self) -> Result<DownloadReport> {
        let config = &self.config;
        let files = remote_files(config.product, &config.range, &config.remote_url);
        let dest = config.layout().download_dir(config.product);
        info!(
            product = %config.product,
            files = files.len(),
            remote = %config.remote_url,
            dest = %dest.display(),
            "Starting download stage"
        );

        let manager = DownloadManager::new(DownloadConfig::from(&config.download))
            .context("Failed to set up downloads")?;
        let report = manager.download_all(files, &dest).await;
        if !report.failed.is_empty() {
            warn!(failed = report.failed.len(), "Some files could not be retrieved");
        }
        Ok(report)
    }

    async fn convert(&self) -> Result<ConversionReport> {
        let layout = self.config.layout();
        info!(dir = %layout.bin_dir().display(), "Starting conversion stage");

        let report = tokio::task::spawn_blocking(move || Converter::new(layout).run())
            .await
            .context("Conversion task panicked")?
            .context("Conversion failed")?;
        Ok(report)
    }

    async fn extract(&self) -> Result<RunSummary> {
        let request = self.config.extraction_request();
        info!(
            regions = %request.regions_file.display(),
            output = %request.output_path().display(),
            "Starting extraction stage"
        );

        let summary = tokio::task::spawn_blocking(move || run_extraction(&request))
            .await
            .context("Extraction task panicked")?
            .context("Extraction failed")?;
        Ok(summary)
    }
}
