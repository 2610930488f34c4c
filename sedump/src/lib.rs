//! sedump - Stack Exchange data dump retrieval
//!
//! This library resolves a user-supplied site identifier against the
//! archive.org data-dump catalog and streams the matching dump files to
//! local disk with cancellable, per-file progress reporting.
//!
//! # Architecture
//!
//! ```text
//! CLI layer ──► command::run ──► ArchiveResolver ──► CatalogClient (archive.org)
//!                   │                  │
//!                   │                  └──► ArchivePicker (interactive pick)
//!                   │
//!                   └──► DownloadOrchestrator ──► FileFetcher (streaming HTTP)
//!                                 │
//!                                 └──► ProgressSink (per-file progress rows)
//! ```
//!
//! The `sedump-cli` binary supplies the concrete terminal implementations
//! (indicatif progress rendering, dialoguer pick prompt); everything in this
//! crate is driven through the trait seams above and is testable without a
//! terminal or network.

pub mod catalog;
pub mod command;
pub mod config;
pub mod fetch;
pub mod orchestrator;
pub mod progress;
pub mod resolver;

pub use catalog::{ArchiveOrgCatalog, CatalogClient, CatalogEntry, TransferUnit};
pub use command::{handle, run, CommandError, DownloadRequest, Fs, OsFs};
pub use config::Config;
pub use fetch::{FetchError, FileFetcher, HttpFetcher, ProgressSample};
pub use orchestrator::{DownloadError, DownloadOrchestrator, DownloadSummary};
pub use progress::{ProgressSink, RowId, RowOutcome};
pub use resolver::{ArchivePicker, ArchiveResolver, PickError, ResolveError};
