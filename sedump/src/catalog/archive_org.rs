//! Catalog client backed by the archive.org metadata API.
//!
//! The Stack Exchange data dumps live in a single archive.org item whose
//! metadata document lists every file it contains. Most sites are a single
//! `site.7z` archive; the largest sites are split per table
//! (`stackoverflow.com-Posts.7z`, `stackoverflow.com-Comments.7z`, ...).
//! This client groups those files back into one catalog entry per site.

use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;

use super::{CatalogClient, CatalogEntry, CatalogError, TransferUnit};

/// Catalog client for an archive.org item.
#[derive(Debug)]
pub struct ArchiveOrgCatalog {
    client: reqwest::Client,
    metadata_url: String,
    download_base_url: String,
}

/// Relevant slice of the archive.org metadata document.
#[derive(Debug, Deserialize)]
struct MetadataDocument {
    #[serde(default)]
    files: Vec<MetadataFile>,
}

/// One file entry in the metadata document.
///
/// The API reports sizes as decimal strings; derived files may omit them.
#[derive(Debug, Deserialize)]
struct MetadataFile {
    name: String,
    #[serde(default)]
    size: Option<String>,
}

impl ArchiveOrgCatalog {
    /// Create a catalog client from the given configuration.
    pub fn new(config: &Config) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| CatalogError::FetchFailed {
                url: config.metadata_url.clone(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            metadata_url: config.metadata_url.clone(),
            download_base_url: config.download_base_url.clone(),
        })
    }

    async fn fetch_entries(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        debug!(url = %self.metadata_url, "fetching catalog metadata");

        let response = self
            .client
            .get(&self.metadata_url)
            .send()
            .await
            .map_err(|e| CatalogError::FetchFailed {
                url: self.metadata_url.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(CatalogError::FetchFailed {
                url: self.metadata_url.clone(),
                reason: format!("request failed with status {}", response.status()),
            });
        }

        let document: MetadataDocument =
            response
                .json()
                .await
                .map_err(|e| CatalogError::ParseFailed {
                    url: self.metadata_url.clone(),
                    reason: e.to_string(),
                })?;

        let entries = group_files(&document.files, &self.download_base_url);
        debug!(
            files = document.files.len(),
            entries = entries.len(),
            "catalog metadata fetched"
        );

        Ok(entries)
    }
}

impl CatalogClient for ArchiveOrgCatalog {
    fn entries(&self) -> BoxFuture<'_, Result<Vec<CatalogEntry>, CatalogError>> {
        Box::pin(self.fetch_entries())
    }
}

/// Group the item's `.7z` dump files into one entry per site, preserving the
/// order files first appear in the metadata document.
fn group_files(files: &[MetadataFile], download_base_url: &str) -> Vec<CatalogEntry> {
    let mut entries: Vec<CatalogEntry> = Vec::new();

    for file in files {
        let Some(stem) = file.name.strip_suffix(".7z") else {
            continue;
        };

        // Split archives name their parts `site-Table.7z`; everything before
        // the first dash is the site.
        let site = stem.split_once('-').map_or(stem, |(site, _)| site);

        let size = file
            .size
            .as_deref()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);

        let unit = TransferUnit::new(
            format!("{}/{}", download_base_url, file.name),
            size,
        );

        match entries.iter_mut().find(|e| e.name == site) {
            Some(entry) => entry.files.push(unit),
            None => entries.push(CatalogEntry {
                name: site.to_string(),
                files: vec![unit],
            }),
        }
    }

    entries
}
