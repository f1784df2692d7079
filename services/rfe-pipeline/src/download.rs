//! Retrieval of remote rainfall files with retry and exponential backoff.
//!
//! Each file is fetched into `<name>.partial` and renamed on success, so an
//! interrupted transfer never leaves a file that discovery would pick up.
//! Files already present locally are skipped. One failed transfer never
//! aborts the others.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::{stream, StreamExt};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use rfe_common::{DateRange, Product};

/// Suffix of in-flight downloads.
pub const PARTIAL_SUFFIX: &str = ".partial";

/// A file that could not be retrieved.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request for {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Giving up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: String,
    },
}

impl RetrievalError {
    /// Client errors (4xx) are not retried: the file does not exist remotely.
    fn is_retryable(&self) -> bool {
        match self {
            RetrievalError::Status { status, .. } => !status.is_client_error(),
            RetrievalError::Client(_) | RetrievalError::Exhausted { .. } => false,
            RetrievalError::Request { .. } | RetrievalError::Write { .. } => true,
        }
    }
}

/// Retry and concurrency limits for the download manager.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub max_concurrent: usize,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry (doubles each retry)
    pub initial_retry_delay: Duration,
    pub max_retry_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            max_retries: 3,
            initial_retry_delay: Duration::from_secs(2),
            max_retry_delay: Duration::from_secs(60),
            request_timeout: Duration::from_secs(300),
        }
    }
}

/// One remote file and its local name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub url: String,
    pub filename: String,
}

/// Remote files covering `range` for `product`.
///
/// ARC2 has one gzip file per day of the exclusive daily range, CHIRPS one
/// file per year of the inclusive year range.
pub fn remote_files(product: Product, range: &DateRange, base_url: &str) -> Vec<RemoteFile> {
    let base = base_url.trim_end_matches('/');
    let pattern = product.remote_pattern();
    let names: Vec<String> = match product {
        Product::Arc2 => range
            .exclusive_daily_range()
            .into_iter()
            .map(|date| pattern.format_day_compressed(date))
            .collect(),
        Product::Chirps => range
            .inclusive_year_range()
            .map(|year| pattern.format_year(year))
            .collect(),
    };

    names
        .into_iter()
        .map(|filename| RemoteFile {
            url: format!("{base}/{filename}"),
            filename,
        })
        .collect()
}

/// Result of one successful retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded(PathBuf),
    /// Already present locally
    Skipped(PathBuf),
}

/// Outcome of a batch.
#[derive(Debug, Default)]
pub struct DownloadReport {
    pub downloaded: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(String, RetrievalError)>,
}

impl DownloadReport {
    pub fn total(&self) -> usize {
        self.downloaded.len() + self.skipped.len() + self.failed.len()
    }
}

/// Fetches remote files into a local directory.
pub struct DownloadManager {
    client: Client,
    config: DownloadConfig,
}

impl DownloadManager {
    pub fn new(config: DownloadConfig) -> Result<Self, RetrievalError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .map_err(RetrievalError::Client)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Retrieve every file into `dest_dir`, `max_concurrent` at a time.
    pub async fn download_all(&self, files: Vec<RemoteFile>, dest_dir: &Path) -> DownloadReport {
        let results = stream::iter(files)
            .map(|file| async move {
                let result = self.download(&file.url, &file.filename, dest_dir).await;
                (file.url, result)
            })
            .buffer_unordered(self.config.max_concurrent.max(1))
            .collect::<Vec<_>>()
            .await;

        let mut report = DownloadReport::default();
        for (url, result) in results {
            match result {
                Ok(DownloadOutcome::Downloaded(path)) => report.downloaded.push(path),
                Ok(DownloadOutcome::Skipped(path)) => report.skipped.push(path),
                Err(e) => {
                    warn!(url = %url, error = %e, "Skipping file that could not be retrieved");
                    report.failed.push((url, e));
                }
            }
        }
        report.downloaded.sort();
        report.skipped.sort();

        info!(
            downloaded = report.downloaded.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Download cycle complete"
        );
        report
    }

    /// Retrieve one file, retrying with exponential backoff.
    #[instrument(skip(self, dest_dir), fields(url = %url))]
    pub async fn download(
        &self,
        url: &str,
        filename: &str,
        dest_dir: &Path,
    ) -> Result<DownloadOutcome, RetrievalError> {
        let final_path = dest_dir.join(filename);
        if final_path.exists() {
            debug!(path = %final_path.display(), "File already exists, skipping download");
            return Ok(DownloadOutcome::Skipped(final_path));
        }

        let write_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| RetrievalError::Write { path, source }
        };
        fs::create_dir_all(dest_dir)
            .await
            .map_err(write_err(dest_dir))?;
        let temp_path = dest_dir.join(format!("{filename}{PARTIAL_SUFFIX}"));

        let mut attempt = 0;
        let mut delay = self.config.initial_retry_delay;
        loop {
            attempt += 1;
            match self.fetch(url, &temp_path).await {
                Ok(bytes) => {
                    fs::rename(&temp_path, &final_path)
                        .await
                        .map_err(write_err(&final_path))?;
                    info!(path = %final_path.display(), bytes = bytes, "Download completed");
                    return Ok(DownloadOutcome::Downloaded(final_path));
                }
                Err(e) => {
                    fs::remove_file(&temp_path).await.ok();

                    if !e.is_retryable() {
                        return Err(e);
                    }
                    if attempt > self.config.max_retries {
                        return Err(RetrievalError::Exhausted {
                            url: url.to_string(),
                            attempts: attempt,
                            last: e.to_string(),
                        });
                    }

                    warn!(
                        error = %e,
                        retry = attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Download failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, self.config.max_retry_delay);
                }
            }
        }
    }

    /// One attempt: stream the body into `temp_path`. Returns the byte count.
    async fn fetch(&self, url: &str, temp_path: &Path) -> Result<u64, RetrievalError> {
        let request_err = |source| RetrievalError::Request {
            url: url.to_string(),
            source,
        };
        let write_err = |source| RetrievalError::Write {
            path: temp_path.to_path_buf(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                url: url.to_string(),
                status,
            });
        }

        let mut file = fs::File::create(temp_path).await.map_err(write_err)?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(request_err)?;
            file.write_all(&chunk).await.map_err(write_err)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::parse(start, end).unwrap()
    }

    fn quick_config(max_retries: u32) -> DownloadConfig {
        DownloadConfig {
            max_concurrent: 2,
            max_retries,
            initial_retry_delay: Duration::from_millis(10),
            max_retry_delay: Duration::from_millis(20),
            request_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_arc2_remote_files() {
        let files = remote_files(
            Product::Arc2,
            &range("2021-05-20", "2021-05-22"),
            "https://example.org/arc2/bin/",
        );
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename, "daily_clim.bin.20210520.gz");
        assert_eq!(
            files[1].url,
            "https://example.org/arc2/bin/daily_clim.bin.20210521.gz"
        );
    }

    #[test]
    fn test_chirps_remote_files() {
        let files = remote_files(
            Product::Chirps,
            &range("2020-12-30", "2022-01-02"),
            "https://example.org/p05",
        );
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "chirps-v2.0.2020.days_p05.nc",
                "chirps-v2.0.2021.days_p05.nc",
                "chirps-v2.0.2022.days_p05.nc",
            ]
        );
    }

    #[test]
    fn test_client_errors_are_not_retried() {
        let not_found = RetrievalError::Status {
            url: "u".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        let unavailable = RetrievalError::Status {
            url: "u".to_string(),
            status: StatusCode::SERVICE_UNAVAILABLE,
        };
        assert!(!not_found.is_retryable());
        assert!(unavailable.is_retryable());
    }

    #[tokio::test]
    async fn test_existing_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("daily_clim.bin.20210520.gz"), b"x").unwrap();

        let manager = DownloadManager::new(quick_config(0)).unwrap();
        let outcome = manager
            .download(
                "http://127.0.0.1:9/daily_clim.bin.20210520.gz",
                "daily_clim.bin.20210520.gz",
                dir.path(),
            )
            .await
            .unwrap();
        assert!(matches!(outcome, DownloadOutcome::Skipped(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_exhausts_retries() {
        let dir = tempfile::tempdir().unwrap();
        let manager = DownloadManager::new(quick_config(1)).unwrap();

        let result = manager
            .download("http://127.0.0.1:9/missing.gz", "missing.gz", dir.path())
            .await;
        assert!(matches!(
            result,
            Err(RetrievalError::Exhausted { attempts: 2, .. })
        ));
        assert!(!dir.path().join("missing.gz").exists());
        assert!(!dir.path().join("missing.gz.partial").exists());
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("present.gz"), b"x").unwrap();
        let manager = DownloadManager::new(quick_config(0)).unwrap();

        let files = vec![
            RemoteFile {
                url: "http://127.0.0.1:9/absent.gz".to_string(),
                filename: "absent.gz".to_string(),
            },
            RemoteFile {
                url: "http://127.0.0.1:9/present.gz".to_string(),
                filename: "present.gz".to_string(),
            },
        ];
        let report = manager.download_all(files, dir.path()).await;
        assert_eq!(report.total(), 2);
        assert_eq!(report.skipped, vec![dir.path().join("present.gz")]);
        assert_eq!(report.failed.len(), 1);
    }
}
