//! Bounded-concurrency image downloader
//!
//! Downloads run on a `JoinSet`, gated by a `Semaphore` so at most
//! `concurrency` transfers are open at once. The dispatch loop acquires a
//! permit before spawning each download and stops dispatching as soon as
//! cancellation is observed; downloads already dispatched run to completion.

use crate::config::DownloadConfig;
use crate::crawler::{content_type, send_get, FetchError};
use crate::download::extension::image_file_name;
use crate::output::EventSink;
use futures::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Errors that can occur while downloading a single image
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("failed to write {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Download settings taken from the crawl configuration
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub output_dir: PathBuf,
    pub concurrency: usize,
    pub timeout: Duration,
}

impl DownloadOptions {
    pub fn from_config(config: &DownloadConfig) -> Self {
        Self {
            output_dir: PathBuf::from(&config.output_dir),
            concurrency: config.concurrency.max(1),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// One image successfully written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedImage {
    /// Dispatch index, part of the file name
    pub index: usize,
    /// Source URL
    pub url: String,
    /// Written file
    pub path: PathBuf,
}

/// Outcome of the download phase
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    /// Number of images in the image set when the phase began
    pub total: usize,
    /// Successful downloads, sorted by index
    pub downloaded: Vec<DownloadedImage>,
    /// Dispatched downloads that failed
    pub failed: usize,
    /// Images never dispatched because of cancellation
    pub skipped: usize,
}

/// Downloads every image URL into the output directory
///
/// Indices are assigned in iteration order at dispatch time, so file names are
/// unique within a run but not stable across runs. The event sink receives a
/// progress update after each successful write and a `[DL ERR]` line for each
/// failure.
///
/// # Arguments
///
/// * `images` - Image URLs to download
/// * `options` - Output directory, concurrency bound and per-image timeout
/// * `client` - The shared HTTP client
/// * `cancel` - Stops further dispatch once cancelled
/// * `sink` - Receives log lines and progress
pub async fn download_all(
    images: Vec<String>,
    options: &DownloadOptions,
    client: &Client,
    cancel: &CancellationToken,
    sink: Arc<dyn EventSink>,
) -> DownloadReport {
    let total = images.len();
    sink.log(&format!("[DL] Starting downloads for {} images", total));

    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let completed = Arc::new(AtomicUsize::new(0));
    let mut pool = JoinSet::new();
    let mut dispatched = 0;

    for (index, url) in images.into_iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }

        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                Ok(p) => p,
                Err(_) => break,
            },
        };

        dispatched += 1;

        let client = client.clone();
        let output_dir = options.output_dir.clone();
        let timeout = options.timeout;
        let completed = Arc::clone(&completed);
        let sink = Arc::clone(&sink);

        pool.spawn(async move {
            let _permit = permit;
            match download_one(&client, &url, index, &output_dir, timeout).await {
                Ok(path) => {
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    sink.progress(done, total);
                    Some(DownloadedImage { index, url, path })
                }
                Err(e) => {
                    sink.log(&format!("[DL ERR] {}: {}", url, e));
                    None
                }
            }
        });
    }

    let mut report = DownloadReport {
        total,
        skipped: total - dispatched,
        ..Default::default()
    };

    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok(Some(image)) => report.downloaded.push(image),
            Ok(None) => report.failed += 1,
            Err(e) => {
                sink.log(&format!("[DL ERR] download task failed: {}", e));
                report.failed += 1;
            }
        }
    }

    report.downloaded.sort_by_key(|image| image.index);
    sink.log("[DL COMPLETE]");
    report
}

/// Downloads one image, streaming the body straight to disk
///
/// On any failure after the file was created, the partial file is removed.
pub async fn download_one(
    client: &Client,
    url: &str,
    index: usize,
    output_dir: &Path,
    timeout: Duration,
) -> Result<PathBuf, DownloadError> {
    let response = send_get(client, url, timeout).await?;
    let path = output_dir.join(image_file_name(index, &content_type(&response)));

    match write_body(response, &path).await {
        Ok(()) => Ok(path),
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                if remove_err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove partial file {}: {}", path.display(), remove_err);
                }
            }
            Err(e)
        }
    }
}

async fn write_body(response: reqwest::Response, path: &Path) -> Result<(), DownloadError> {
    let io_err = |source| DownloadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).await.map_err(io_err)?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::from_reqwest)?;
        file.write_all(&chunk).await.map_err(io_err)?;
    }

    file.flush().await.map_err(io_err)?;
    Ok(())
}
