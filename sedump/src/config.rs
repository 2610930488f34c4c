//! Configuration for catalog and download endpoints.

use std::time::Duration;

/// The archive.org item holding the Stack Exchange data dumps.
const DEFAULT_CATALOG_ITEM: &str = "stackexchange";

/// Base URL of the archive.org metadata API.
const METADATA_BASE_URL: &str = "https://archive.org/metadata";

/// Base URL for direct file downloads from an archive.org item.
const DOWNLOAD_BASE_URL: &str = "https://archive.org/download";

/// Configuration for the dump downloader.
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the catalog metadata document.
    pub metadata_url: String,

    /// Base URL that file names are appended to when downloading.
    pub download_base_url: String,

    /// Connect timeout for HTTP requests.
    ///
    /// Deliberately not a whole-request timeout: dump transfers run for
    /// minutes and are bounded by cancellation, not a deadline.
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_item(DEFAULT_CATALOG_ITEM)
    }
}

impl Config {
    /// Create a configuration pointing at the given archive.org item.
    pub fn for_item(item: &str) -> Self {
        Self {
            metadata_url: format!("{}/{}", METADATA_BASE_URL, item),
            download_base_url: format!("{}/{}", DOWNLOAD_BASE_URL, item),
            connect_timeout: Duration::from_secs(30),
        }
    }

    /// Override the catalog metadata URL.
    pub fn with_metadata_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_url = url.into();
        self
    }

    /// Override the download base URL.
    pub fn with_download_base_url(mut self, url: impl Into<String>) -> Self {
        self.download_base_url = url.into();
        self
    }

    /// Set the HTTP connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
