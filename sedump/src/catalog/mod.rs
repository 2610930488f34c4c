//! Catalog model for archive.org data-dump items.
//!
//! A catalog is the ordered list of archives available on the hosting
//! service. Each [`CatalogEntry`] is one site's dump and expands into one or
//! more [`TransferUnit`]s, the individual remote files to download.

mod archive_org;
mod client;

pub use archive_org::ArchiveOrgCatalog;
pub use client::CatalogClient;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog document could not be fetched.
    #[error("failed to fetch catalog from {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// The catalog document could not be parsed.
    #[error("failed to parse catalog from {url}: {reason}")]
    ParseFailed { url: String, reason: String },
}

/// One remote file belonging to a resolved archive.
///
/// Pure data: a source URL, the size the catalog declares for it, and a
/// human-readable label for progress display. The declared size is advisory;
/// the fetcher trusts the transfer's own headers when they disagree.
#[derive(Debug, Clone)]
pub struct TransferUnit {
    /// Download URL of the remote file.
    pub url: String,

    /// Size in bytes as declared by the catalog (0 when unknown).
    pub size: u64,

    /// Label shown in progress output, normally the file name.
    pub label: String,
}

impl TransferUnit {
    /// Create a transfer unit labelled with the URL's file name.
    pub fn new(url: impl Into<String>, size: u64) -> Self {
        let url = url.into();
        let label = final_path_segment(&url).to_string();
        Self { url, size, label }
    }

    /// The file name this unit is saved under: the final path segment of
    /// its URL.
    pub fn file_name(&self) -> &str {
        final_path_segment(&self.url)
    }

    /// The on-disk destination for this unit inside `dest_dir`.
    pub fn destination(&self, dest_dir: &std::path::Path) -> PathBuf {
        dest_dir.join(self.file_name())
    }
}

/// Identity is the remote location; sizes and labels are presentation.
impl PartialEq for TransferUnit {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for TransferUnit {}

fn final_path_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// One archive known to the catalog: a canonical site name plus the ordered
/// files that make up its dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Canonical site name, e.g. `aviation.stackexchange.com`.
    pub name: String,

    /// Files belonging to this archive, in catalog order.
    pub files: Vec<TransferUnit>,
}

impl CatalogEntry {
    /// Total declared size of all files in this entry.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}
