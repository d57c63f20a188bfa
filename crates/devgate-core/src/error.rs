//! Error types for the DevGate CLI.
//!
//! This module provides the error taxonomy for all failure modes in the
//! DevGate system, organized by domain:
//!
//! - [`ValidationError`] - Input rejected before any external call
//! - [`DeviceError`] - Transport resolution and device protocol failures
//! - [`ServiceError`] - External ledger service and catalog failures
//! - [`FirmwareError`] - Firmware acquisition and image validation failures
//! - [`ConfigError`] - Configuration loading failures
//! - [`DevgateError`] - Top-level error that wraps all error types
//!
//! Usage errors (bad or unknown commands and arguments) are handled by the
//! argument parser before any of these types come into play: help is
//! printed and the process exits non-zero without contacting a device.
//!
//! # Example
//!
//! ```rust
//! use devgate_core::error::{DevgateError, ValidationError};
//!
//! fn reject_unit(unit: &str) -> Result<(), DevgateError> {
//!     Err(ValidationError::unrecognized_unit(unit).into())
//! }
//!
//! let err = reject_unit("parsec").unwrap_err();
//! assert_eq!(err.exit_code(), 1);
//! ```

/// Top-level error type for the DevGate CLI.
///
/// Wraps all domain-specific error types and provides automatic conversion
/// via the `#[from]` attribute. The [`exit_code`](Self::exit_code) mapping
/// determines the process exit status for a failed invocation.
#[derive(Debug, thiserror::Error)]
pub enum DevgateError {
    /// Input validation failed before any external call.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Transport resolution or device protocol failure.
    #[error("{0}")]
    Device(#[from] DeviceError),

    /// External ledger service or catalog failure.
    #[error("{0}")]
    Service(#[from] ServiceError),

    /// Firmware acquisition or validation failure.
    #[error("{0}")]
    Firmware(#[from] FirmwareError),

    /// Configuration loading failure.
    #[error("{0}")]
    Config(#[from] ConfigError),
}

impl DevgateError {
    /// Returns the process exit status for this error.
    ///
    /// A device protocol failure propagates its status code as the exit
    /// status (clamped to the valid range); every other failure exits 1.
    /// Usage errors never reach this path: the argument parser exits on
    /// its own with status 2.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Device(DeviceError::Protocol { code, .. }) => {
                i32::try_from(*code).map_or(255, |c| c.clamp(1, 255))
            }
            _ => 1,
        }
    }

    /// Returns a stable machine-readable kind tag for the error envelope.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Device(DeviceError::NotFound { .. }) => "device_not_found",
            Self::Device(_) => "device",
            Self::Service(_) => "service",
            Self::Firmware(_) => "firmware",
            Self::Config(_) => "config",
        }
    }

    /// Returns the device status code if this is a protocol failure.
    #[must_use]
    pub const fn protocol_code(&self) -> Option<u32> {
        match self {
            Self::Device(DeviceError::Protocol { code, .. }) => Some(*code),
            _ => None,
        }
    }
}

// ============================================================================
// ValidationError
// ============================================================================

/// Errors for input that is rejected locally, before any network access
/// or device contact.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The amount suffix is not present in the unit table.
    #[error("unrecognized unit: {unit}")]
    UnrecognizedUnit {
        /// The unit string that failed the lookup.
        unit: String,
    },

    /// Hex input was malformed (odd length or non-hex characters).
    #[error("invalid hex: {context}")]
    InvalidHex {
        /// Context about what was being decoded.
        context: String,
    },

    /// The amount string could not be parsed.
    #[error("invalid amount: {input}")]
    InvalidAmount {
        /// The input that failed to parse.
        input: String,
    },

    /// The derivation path string could not be parsed.
    #[error("invalid derivation path: {path}")]
    InvalidDerivationPath {
        /// The path string that failed to parse.
        path: String,
    },
}

impl ValidationError {
    /// Create an `UnrecognizedUnit` error.
    #[must_use]
    pub fn unrecognized_unit(unit: impl Into<String>) -> Self {
        Self::UnrecognizedUnit { unit: unit.into() }
    }

    /// Create an `InvalidHex` error with context.
    #[must_use]
    pub fn invalid_hex(context: impl Into<String>) -> Self {
        Self::InvalidHex {
            context: context.into(),
        }
    }

    /// Create an `InvalidAmount` error.
    #[must_use]
    pub fn invalid_amount(input: impl Into<String>) -> Self {
        Self::InvalidAmount {
            input: input.into(),
        }
    }

    /// Create an `InvalidDerivationPath` error.
    #[must_use]
    pub fn invalid_derivation_path(path: impl Into<String>) -> Self {
        Self::InvalidDerivationPath { path: path.into() }
    }
}

// ============================================================================
// DeviceError
// ============================================================================

/// Errors at the device boundary: transport resolution, framing, and
/// protocol-level refusals.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Transport discovery found no matching device.
    #[error("no device found on {transport} transport")]
    NotFound {
        /// The transport kind that was scanned.
        transport: String,
    },

    /// The transport could not be opened or the I/O failed.
    #[error("transport error: {context}")]
    Transport {
        /// Context about the failing operation.
        context: String,
    },

    /// A wire frame was malformed or truncated.
    #[error("invalid wire frame: {context}")]
    Frame {
        /// Context about the malformed frame.
        context: String,
    },

    /// The device refused the request.
    ///
    /// This covers every in-protocol failure the device can report,
    /// including interactive user cancellation. The status code is
    /// propagated as the process exit status.
    #[error("device failure (code {code}): {message}")]
    Protocol {
        /// Device status code.
        code: u32,
        /// Human-readable message from the device.
        message: String,
    },
}

impl DeviceError {
    /// Create a `NotFound` error for a transport kind.
    #[must_use]
    pub fn not_found(transport: impl Into<String>) -> Self {
        Self::NotFound {
            transport: transport.into(),
        }
    }

    /// Create a `Transport` error with context.
    #[must_use]
    pub fn transport(context: impl Into<String>) -> Self {
        Self::Transport {
            context: context.into(),
        }
    }

    /// Create a `Frame` error with context.
    #[must_use]
    pub fn frame(context: impl Into<String>) -> Self {
        Self::Frame {
            context: context.into(),
        }
    }

    /// Create a `Protocol` error from a device status code and message.
    #[must_use]
    pub fn protocol(code: u32, message: impl Into<String>) -> Self {
        Self::Protocol {
            code,
            message: message.into(),
        }
    }
}

// ============================================================================
// ServiceError
// ============================================================================

/// Errors from external collaborators reached over HTTP: the ledger
/// JSON-RPC service, the bridge daemon, and the release catalog.
///
/// The underlying message is surfaced verbatim; there are no retries, so
/// every failure is terminal for the current invocation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The HTTP request failed.
    #[error("request to {url} failed: {message}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// The underlying error message.
        message: String,
    },

    /// The request exceeded the overall operation timeout.
    #[error("request to {url} timed out")]
    Timeout {
        /// The URL that was requested.
        url: String,
    },

    /// The remote RPC endpoint returned an error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// The RPC error code.
        code: i64,
        /// The RPC error message.
        message: String,
    },

    /// The response body could not be interpreted.
    #[error("malformed response: {context}")]
    MalformedResponse {
        /// Context about what was expected.
        context: String,
    },
}

impl ServiceError {
    /// Create an `Http` error from a URL and an underlying message.
    #[must_use]
    pub fn http(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a `Timeout` error for a URL.
    #[must_use]
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Create a `MalformedResponse` error with context.
    #[must_use]
    pub fn malformed_response(context: impl Into<String>) -> Self {
        Self::MalformedResponse {
            context: context.into(),
        }
    }
}

// ============================================================================
// FirmwareError
// ============================================================================

/// Errors from the firmware acquisition pipeline.
#[derive(Debug, thiserror::Error)]
pub enum FirmwareError {
    /// The image starts with neither the binary magic nor its hex encoding.
    #[error("invalid firmware image: {context}")]
    InvalidImage {
        /// Context about the rejected prefix.
        context: String,
    },

    /// The requested version is not present in the release catalog.
    #[error("firmware version {version} not found in release catalog")]
    NotFound {
        /// The version string that was requested.
        version: String,
    },

    /// The image digest does not match the catalog fingerprint.
    #[error("fingerprint mismatch: expected {expected}, got {actual}")]
    FingerprintMismatch {
        /// The fingerprint declared by the catalog entry.
        expected: String,
        /// The computed fingerprint of the fetched image.
        actual: String,
    },

    /// The local firmware file could not be read.
    #[error("failed to read firmware file: {0}")]
    Io(#[from] std::io::Error),
}

impl FirmwareError {
    /// Create an `InvalidImage` error with context.
    #[must_use]
    pub fn invalid_image(context: impl Into<String>) -> Self {
        Self::InvalidImage {
            context: context.into(),
        }
    }

    /// Create a `NotFound` error for a version string.
    #[must_use]
    pub fn not_found(version: impl Into<String>) -> Self {
        Self::NotFound {
            version: version.into(),
        }
    }
}

// ============================================================================
// ConfigError
// ============================================================================

/// Errors while loading the optional configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read config file {path}: {message}")]
    Read {
        /// Path to the configuration file.
        path: String,
        /// The underlying I/O error message.
        message: String,
    },

    /// The configuration file could not be parsed as TOML.
    #[error("failed to parse config file {path}: {message}")]
    Parse {
        /// Path to the configuration file.
        path: String,
        /// The underlying parse error message.
        message: String,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_protocol_failure_propagates() {
        let err = DevgateError::from(DeviceError::protocol(4, "action cancelled"));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_exit_code_protocol_failure_clamped() {
        let err = DevgateError::from(DeviceError::protocol(0, "bogus"));
        assert_eq!(err.exit_code(), 1);

        let err = DevgateError::from(DeviceError::protocol(70_000, "huge"));
        assert_eq!(err.exit_code(), 255);
    }

    #[test]
    fn test_exit_code_generic_errors() {
        let err = DevgateError::from(ValidationError::unrecognized_unit("parsec"));
        assert_eq!(err.exit_code(), 1);

        let err = DevgateError::from(ServiceError::timeout("http://localhost:8545"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(
            DevgateError::from(DeviceError::not_found("usb")).kind(),
            "device_not_found"
        );
        assert_eq!(
            DevgateError::from(DeviceError::protocol(4, "cancelled")).kind(),
            "device"
        );
        assert_eq!(
            DevgateError::from(FirmwareError::not_found("9.9.9")).kind(),
            "firmware"
        );
    }

    #[test]
    fn test_display_messages() {
        let err = ValidationError::unrecognized_unit("lightyear");
        assert_eq!(err.to_string(), "unrecognized unit: lightyear");

        let err = DeviceError::protocol(4, "user cancelled on device");
        assert_eq!(
            err.to_string(),
            "device failure (code 4): user cancelled on device"
        );
    }

    #[test]
    fn test_protocol_code_accessor() {
        let err = DevgateError::from(DeviceError::protocol(9, "wipe refused"));
        assert_eq!(err.protocol_code(), Some(9));

        let err = DevgateError::from(ValidationError::invalid_hex("odd length"));
        assert_eq!(err.protocol_code(), None);
    }
}
