//! # devgate-core
//!
//! Shared types for the DevGate CLI: the error taxonomy, the report
//! rendering model, and configuration loading.
//!
//! This crate is an internal implementation detail of the `devgate`
//! binary. The API is unstable and may change without notice between any
//! versions, including patch releases.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and exit-code mapping
//! - [`report`] - Deterministic text/JSON rendering of command results
//! - [`config`] - Optional TOML configuration file

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod report;

pub use config::Config;
pub use error::{
    ConfigError, DeviceError, DevgateError, FirmwareError, ServiceError, ValidationError,
};
pub use report::{ByteEncoding, Report};
