//! # devgate-firmware
//!
//! Firmware acquisition for the DevGate CLI: release catalog access,
//! multi-source resolution, and image validation.
//!
//! This crate is an internal implementation detail of the `devgate`
//! binary; its API is unstable.
//!
//! ## Modules
//!
//! - [`catalog`] - Remote release catalog and version selection
//! - [`source`] - File / URL / catalog resolution, first match wins
//! - [`image`] - Header validation and fingerprinting

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod image;
pub mod source;

pub use catalog::{ReleaseCatalog, ReleaseEntry, DEFAULT_CATALOG_URL};
pub use image::{fingerprint, validate, IMAGE_MAGIC};
pub use source::{acquire, FirmwareCandidate, FirmwareSelector, Provenance};
