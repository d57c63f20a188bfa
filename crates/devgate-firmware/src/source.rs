//! Firmware source resolution.
//!
//! A firmware image can come from an explicit local file, an explicit
//! URL, an exact catalog version, or — with no selector at all — the
//! latest catalog release. Resolution walks those sources in that
//! order and the first match wins; the provenance tag records which one
//! did.

use std::path::PathBuf;

use devgate_core::error::{DevgateError, FirmwareError};

use crate::catalog::{fetch_bytes, ReleaseCatalog};

/// Where a firmware candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Read from an explicit local file.
    File,
    /// Fetched from an explicit URL.
    Url,
    /// Selected from the remote release catalog.
    Catalog,
}

/// The caller's firmware selection, one source at most.
#[derive(Debug, Clone, Default)]
pub struct FirmwareSelector {
    /// Explicit local file path.
    pub file: Option<PathBuf>,
    /// Explicit download URL.
    pub url: Option<String>,
    /// Exact catalog version string, e.g. `"1.2.0"`.
    pub version: Option<String>,
}

/// An acquired firmware blob, not yet validated.
#[derive(Debug, Clone)]
pub struct FirmwareCandidate {
    /// The raw blob as acquired.
    pub bytes: Vec<u8>,
    /// Which source produced it.
    pub provenance: Provenance,
    /// Version declared by the catalog, when catalog-sourced.
    pub version: Option<String>,
    /// Fingerprint declared by the catalog, when catalog-sourced.
    pub fingerprint: Option<String>,
}

/// Acquire a firmware blob, first matching source wins.
///
/// With no selector supplied, the catalog is fetched and the entry with
/// the maximum version tuple is chosen; the chosen version and expected
/// fingerprint travel with the candidate so the caller can report and
/// verify them.
///
/// # Errors
///
/// Returns [`FirmwareError::Io`] for an unreadable file,
/// [`ServiceError`](devgate_core::error::ServiceError) for fetch
/// failures, and [`FirmwareError::NotFound`] when an explicit version is
/// missing from the catalog (or the catalog is empty).
pub fn acquire(
    selector: &FirmwareSelector,
    catalog_url: &str,
) -> Result<FirmwareCandidate, DevgateError> {
    if let Some(path) = &selector.file {
        let bytes = std::fs::read(path).map_err(FirmwareError::from)?;
        return Ok(FirmwareCandidate {
            bytes,
            provenance: Provenance::File,
            version: None,
            fingerprint: None,
        });
    }

    if let Some(url) = &selector.url {
        let bytes = fetch_bytes(url)?;
        return Ok(FirmwareCandidate {
            bytes,
            provenance: Provenance::Url,
            version: None,
            fingerprint: None,
        });
    }

    let catalog = ReleaseCatalog::fetch(catalog_url)?;
    acquire_from_catalog(&catalog, selector.version.as_deref(), catalog_url)
}

/// Select and download an image from an already-fetched catalog.
///
/// # Errors
///
/// Returns [`FirmwareError::NotFound`] for a version missing from the
/// catalog, or a service error if the download fails.
pub fn acquire_from_catalog(
    catalog: &ReleaseCatalog,
    version: Option<&str>,
    catalog_url: &str,
) -> Result<FirmwareCandidate, DevgateError> {
    let entry = match version {
        Some(wanted) => catalog
            .find(wanted)
            .ok_or_else(|| FirmwareError::not_found(wanted))?,
        None => catalog
            .latest()
            .ok_or_else(|| FirmwareError::not_found("latest"))?,
    };

    tracing::info!(
        version = %entry.version_string(),
        fingerprint = %entry.fingerprint,
        "selected firmware release"
    );

    let bytes = fetch_bytes(&entry.download_url(catalog_url))?;
    Ok(FirmwareCandidate {
        bytes,
        provenance: Provenance::Catalog,
        version: Some(entry.version_string()),
        fingerprint: Some(entry.fingerprint.clone()),
    })
}
