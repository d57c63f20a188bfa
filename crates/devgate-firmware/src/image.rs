//! Firmware image validation.
//!
//! Release images come in two on-disk forms: raw binary beginning with
//! the canonical magic, or the same bytes hex-encoded (as some release
//! channels ship them). Validation normalizes both to raw bytes and
//! rejects everything else; the caller may skip it explicitly, in which
//! case the blob streams to the device untouched.

use devgate_core::error::FirmwareError;
use sha2::{Digest, Sha256};

/// Canonical magic at the start of every firmware image.
pub const IMAGE_MAGIC: &[u8; 4] = b"DGFW";

/// Validate a firmware blob and normalize it to raw image bytes.
///
/// A blob whose prefix is the hex encoding of [`IMAGE_MAGIC`] is
/// hex-decoded in full (trailing ASCII whitespace tolerated); a blob
/// already beginning with the magic passes through unchanged.
///
/// # Errors
///
/// Returns [`FirmwareError::InvalidImage`] for any other prefix, or
/// when the hex form fails to decode.
pub fn validate(blob: &[u8]) -> Result<Vec<u8>, FirmwareError> {
    let hex_magic = hex::encode(IMAGE_MAGIC);
    if blob.starts_with(hex_magic.as_bytes()) {
        let text = std::str::from_utf8(blob)
            .map_err(|_| FirmwareError::invalid_image("hex image contains non-ASCII bytes"))?;
        let decoded = hex::decode(text.trim_end())
            .map_err(|e| FirmwareError::invalid_image(format!("hex image: {e}")))?;
        // The decoded bytes necessarily start with the magic.
        return Ok(decoded);
    }
    if blob.starts_with(IMAGE_MAGIC) {
        return Ok(blob.to_vec());
    }
    Err(FirmwareError::invalid_image(format!(
        "unrecognized header {:02x?}",
        blob.get(..4).unwrap_or(blob)
    )))
}

/// SHA-256 fingerprint of an image, as lowercase hex.
#[must_use]
pub fn fingerprint(image: &[u8]) -> String {
    hex::encode(Sha256::digest(image))
}
