//! Streaming file fetcher with cancellation and progress reporting.
//!
//! [`HttpFetcher`] streams one remote file into the destination directory,
//! emitting a [`ProgressSample`] per chunk over an explicit channel and
//! checking the cancellation token at every chunk boundary. Cancellation and
//! mid-stream failures leave the partial file on disk; there is no resume.

use std::io;
use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use futures::StreamExt;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::catalog::TransferUnit;
use crate::config::Config;

/// One point-in-time progress reading for a single transfer.
///
/// `total` starts from the catalog's declared size and is revised once the
/// response headers (or the byte count actually written) say otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSample {
    /// Bytes transferred so far.
    pub bytes: u64,
    /// Expected total bytes.
    pub total: u64,
}

/// Errors that can occur while fetching a single file.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Failed to create the HTTP client.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// The underlying transfer failed.
    #[error("download of {label} failed: {reason}")]
    TransferFailed { label: String, reason: String },

    /// The destination file could not be written.
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The transfer was cancelled.
    #[error("download was cancelled")]
    Cancelled,
}

/// Trait for fetching one transfer unit to disk.
///
/// This abstraction lets the orchestrator be exercised in tests with
/// scripted fetchers instead of live transfers.
pub trait FileFetcher: Send + Sync {
    /// Stream `unit` into `dest_dir`, reporting progress over `progress`.
    ///
    /// Samples are monotonically non-decreasing in bytes transferred and end
    /// at the actual byte count written. Cancellation is observed at chunk
    /// granularity and reported as [`FetchError::Cancelled`].
    fn fetch<'a>(
        &'a self,
        unit: &'a TransferUnit,
        dest_dir: &'a Path,
        progress: UnboundedSender<ProgressSample>,
        token: CancellationToken,
    ) -> BoxFuture<'a, Result<(), FetchError>>;
}

/// HTTP fetcher streaming responses straight to disk.
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher from the given configuration.
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    async fn fetch_file(
        &self,
        unit: &TransferUnit,
        dest_dir: &Path,
        progress: UnboundedSender<ProgressSample>,
        token: CancellationToken,
    ) -> Result<(), FetchError> {
        debug!(url = %unit.url, "starting transfer");

        let response = tokio::select! {
            _ = token.cancelled() => return Err(FetchError::Cancelled),
            response = self.client.get(&unit.url).send() => {
                response.map_err(|e| transfer_failed(unit, e.to_string()))?
            }
        };

        if !response.status().is_success() {
            return Err(transfer_failed(
                unit,
                format!("request failed with status {}", response.status()),
            ));
        }

        // The response header is authoritative; the catalog size is the
        // fallback when the server does not declare one.
        let mut total = response.content_length().unwrap_or(unit.size);

        let (path, mut file) = open_destination(unit, dest_dir).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        loop {
            let chunk = tokio::select! {
                _ = token.cancelled() => {
                    let _ = file.flush().await;
                    warn!(label = %unit.label, bytes = downloaded,
                        "transfer cancelled, partial file left on disk");
                    return Err(FetchError::Cancelled);
                }
                chunk = stream.next() => chunk,
            };

            match chunk {
                Some(Ok(bytes)) => {
                    file.write_all(&bytes).await.map_err(|e| FetchError::Write {
                        path: path.clone(),
                        source: e,
                    })?;

                    downloaded += bytes.len() as u64;
                    if downloaded > total {
                        total = downloaded;
                    }
                    let _ = progress.send(ProgressSample {
                        bytes: downloaded,
                        total,
                    });
                }
                Some(Err(e)) => {
                    warn!(label = %unit.label, bytes = downloaded, "transfer failed mid-stream");
                    return Err(transfer_failed(unit, e.to_string()));
                }
                None => break,
            }
        }

        file.flush().await.map_err(|e| FetchError::Write {
            path: path.clone(),
            source: e,
        })?;

        // What reached the disk is the final word on the total.
        let _ = progress.send(ProgressSample {
            bytes: downloaded,
            total: downloaded,
        });

        debug!(label = %unit.label, bytes = downloaded, "transfer complete");
        Ok(())
    }
}

impl FileFetcher for HttpFetcher {
    fn fetch<'a>(
        &'a self,
        unit: &'a TransferUnit,
        dest_dir: &'a Path,
        progress: UnboundedSender<ProgressSample>,
        token: CancellationToken,
    ) -> BoxFuture<'a, Result<(), FetchError>> {
        Box::pin(self.fetch_file(unit, dest_dir, progress, token))
    }
}

fn transfer_failed(unit: &TransferUnit, reason: String) -> FetchError {
    FetchError::TransferFailed {
        label: unit.label.clone(),
        reason,
    }
}

/// Open the unit's destination file, truncating any previous download of the
/// same name.
async fn open_destination(
    unit: &TransferUnit,
    dest_dir: &Path,
) -> Result<(PathBuf, File), FetchError> {
    let path = unit.destination(dest_dir);
    let file = File::create(&path).await.map_err(|e| FetchError::Write {
        path: path.clone(),
        source: e,
    })?;
    Ok((path, file))
}
