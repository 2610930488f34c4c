//! The download command: validate, resolve, orchestrate.
//!
//! This is the single entry point the CLI layer calls into. It owns no
//! terminal concerns; the caller supplies the progress sink, the picker
//! (inside the resolver) and a narrow filesystem view.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::catalog::CatalogClient;
use crate::fetch::FileFetcher;
use crate::orchestrator::{DownloadError, DownloadOrchestrator, DownloadSummary};
use crate::progress::ProgressSink;
use crate::resolver::{ArchivePicker, ArchiveResolver, ResolveError};

/// Exit code for a fully successful run.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for any failure.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for user-initiated cancellation.
pub const EXIT_CANCELLED: i32 = 130;

/// Narrow filesystem view used by the handler.
///
/// Passed in explicitly so tests can fake the working directory and the
/// existence checks without touching the real filesystem.
pub trait Fs: Send + Sync {
    /// Whether `path` exists and is a directory.
    fn dir_exists(&self, path: &Path) -> bool;

    /// The process's current working directory.
    fn current_dir(&self) -> io::Result<PathBuf>;
}

/// Production [`Fs`] implementation backed by the OS.
#[derive(Debug, Default)]
pub struct OsFs;

impl Fs for OsFs {
    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }
}

/// Errors surfaced by the download command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The output directory does not exist. Surfaced before any network I/O.
    #[error("output path {} not found", .0.display())]
    InvalidOutputPath(PathBuf),

    /// The working directory could not be determined.
    #[error("could not determine the current directory: {0}")]
    CurrentDir(io::Error),

    /// Archive resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A download failed or was cancelled.
    #[error(transparent)]
    Download(#[from] DownloadError),
}

impl CommandError {
    /// Whether this outcome is a user-initiated cancellation rather than a
    /// failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Self::Resolve(ResolveError::Cancelled) | Self::Download(DownloadError::Cancelled)
        )
    }

    /// The process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        if self.is_cancellation() {
            EXIT_CANCELLED
        } else {
            EXIT_FAILURE
        }
    }
}

/// Parameters of one download invocation.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Identifier to match against catalog entry names.
    pub archive: String,

    /// Output directory; `None` means the current working directory. The
    /// directory must already exist.
    pub output: Option<PathBuf>,

    /// Allow interactive selection when the identifier is ambiguous.
    pub pick: bool,
}

/// Run the download command.
///
/// Validates the output directory, resolves the identifier to an archive and
/// downloads its files in order. Fails fast on a missing output directory
/// before any network I/O happens.
pub async fn run<C, P, F>(
    request: &DownloadRequest,
    resolver: &ArchiveResolver<C, P>,
    orchestrator: &DownloadOrchestrator<F>,
    fs: &dyn Fs,
    sink: &mut dyn ProgressSink,
    token: &CancellationToken,
) -> Result<DownloadSummary, CommandError>
where
    C: CatalogClient,
    P: ArchivePicker,
    F: FileFetcher,
{
    let output = resolve_output_dir(request.output.as_deref(), fs)?;
    if !fs.dir_exists(&output) {
        return Err(CommandError::InvalidOutputPath(output));
    }

    info!(archive = %request.archive, output = %output.display(), "resolving archive");
    let entry = resolver.resolve(&request.archive, request.pick, token).await?;
    info!(name = %entry.name, files = entry.files.len(), "archive resolved");

    let summary = orchestrator.run(&entry.files, &output, sink, token).await?;
    Ok(summary)
}

/// Run the download command and reduce the outcome to an exit code,
/// logging the failure cause.
pub async fn handle<C, P, F>(
    request: &DownloadRequest,
    resolver: &ArchiveResolver<C, P>,
    orchestrator: &DownloadOrchestrator<F>,
    fs: &dyn Fs,
    sink: &mut dyn ProgressSink,
    token: &CancellationToken,
) -> i32
where
    C: CatalogClient,
    P: ArchivePicker,
    F: FileFetcher,
{
    match run(request, resolver, orchestrator, fs, sink, token).await {
        Ok(summary) => {
            info!(files = summary.files, bytes = summary.bytes, "download finished");
            EXIT_SUCCESS
        }
        Err(e) if e.is_cancellation() => {
            info!("download cancelled");
            e.exit_code()
        }
        Err(e) => {
            error!(error = %e, "download failed");
            e.exit_code()
        }
    }
}

fn resolve_output_dir(output: Option<&Path>, fs: &dyn Fs) -> Result<PathBuf, CommandError> {
    match output {
        Some(path) if !path.as_os_str().is_empty() => Ok(path.to_path_buf()),
        _ => fs.current_dir().map_err(CommandError::CurrentDir),
    }
}
