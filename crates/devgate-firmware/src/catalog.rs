//! Remote release catalog.
//!
//! The catalog is a fetchable JSON document listing released firmware
//! images: a version tuple, a download path relative to the catalog
//! location, and the expected image fingerprint. It is read-only once
//! loaded.
//!
//! "Latest" means the entry with the maximum version tuple under
//! component-wise integer comparison, most significant first — never a
//! string comparison.

use std::time::Duration;

use devgate_core::error::ServiceError;
use serde::Deserialize;

/// Default release catalog URL.
pub const DEFAULT_CATALOG_URL: &str = "https://releases.devgate.dev/firmware";

/// Name of the catalog index document under the catalog URL.
const INDEX_DOCUMENT: &str = "releases.json";

/// Timeout for catalog and image fetches.
const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// One released firmware image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseEntry {
    /// Version as an ordered tuple of integers, most significant first.
    pub version: Vec<u32>,
    /// Download path relative to the catalog URL.
    pub url: String,
    /// Expected SHA-256 fingerprint of the raw image, lowercase hex.
    pub fingerprint: String,
}

impl ReleaseEntry {
    /// Dotted form of the version tuple, e.g. `"1.2.0"`.
    #[must_use]
    pub fn version_string(&self) -> String {
        self.version
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Absolute download URL for this entry.
    #[must_use]
    pub fn download_url(&self, catalog_url: &str) -> String {
        if self.url.starts_with("http://") || self.url.starts_with("https://") {
            self.url.clone()
        } else {
            format!("{}/{}", catalog_url.trim_end_matches('/'), self.url)
        }
    }
}

/// The parsed release catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCatalog {
    entries: Vec<ReleaseEntry>,
}

impl ReleaseCatalog {
    /// Build a catalog from entries (used by tests and [`fetch`](Self::fetch)).
    #[must_use]
    pub fn from_entries(entries: Vec<ReleaseEntry>) -> Self {
        Self { entries }
    }

    /// Fetch and parse the catalog index.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the fetch fails or the document does
    /// not parse.
    pub fn fetch(catalog_url: &str) -> Result<Self, ServiceError> {
        let url = format!("{}/{INDEX_DOCUMENT}", catalog_url.trim_end_matches('/'));
        tracing::debug!(url = %url, "fetching release catalog");
        let entries: Vec<ReleaseEntry> = http_client()?
            .get(&url)
            .send()
            .map_err(|e| fetch_error(&url, &e))?
            .error_for_status()
            .map_err(|e| ServiceError::http(&url, e.to_string()))?
            .json()
            .map_err(|e| ServiceError::malformed_response(format!("release catalog: {e}")))?;
        Ok(Self::from_entries(entries))
    }

    /// All entries, in catalog order.
    #[must_use]
    pub fn entries(&self) -> &[ReleaseEntry] {
        &self.entries
    }

    /// The entry with the maximum version tuple, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&ReleaseEntry> {
        self.entries.iter().max_by_key(|entry| &entry.version)
    }

    /// The entry whose version string matches `version` exactly.
    #[must_use]
    pub fn find(&self, version: &str) -> Option<&ReleaseEntry> {
        self.entries
            .iter()
            .find(|entry| entry.version_string() == version)
    }
}

/// Fetch raw bytes from a URL (firmware images).
///
/// # Errors
///
/// Returns [`ServiceError`] on any HTTP failure.
pub fn fetch_bytes(url: &str) -> Result<Vec<u8>, ServiceError> {
    tracing::debug!(url = %url, "fetching firmware image");
    let response = http_client()?
        .get(url)
        .send()
        .map_err(|e| fetch_error(url, &e))?
        .error_for_status()
        .map_err(|e| ServiceError::http(url, e.to_string()))?;
    response
        .bytes()
        .map(|b| b.to_vec())
        .map_err(|e| ServiceError::http(url, e.to_string()))
}

fn http_client() -> Result<reqwest::blocking::Client, ServiceError> {
    reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| ServiceError::http("catalog", e.to_string()))
}

fn fetch_error(url: &str, error: &reqwest::Error) -> ServiceError {
    if error.is_timeout() {
        ServiceError::timeout(url)
    } else {
        ServiceError::http(url, error.to_string())
    }
}
