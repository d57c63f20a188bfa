//! The `devgate sign-message` command.

use devgate_core::error::DevgateError;
use devgate_core::report::{ByteEncoding, Report};
use devgate_device::path::parse_path;
use devgate_device::DeviceClient;

/// Sign a personal message with a device key.
///
/// The signature is a designated encoded envelope and renders as
/// base64; the signing address renders as `0x` + lowercase hex.
#[derive(Debug, Clone)]
pub struct SignMessageCommand {
    /// Derivation path string selecting the signing key.
    pub derivation: String,
    /// The message text.
    pub message: String,
}

impl SignMessageCommand {
    /// Run the command against an open session.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed derivation path and
    /// propagates device failures, including user cancellation.
    pub fn run(&self, device: &mut dyn DeviceClient) -> Result<Report, DevgateError> {
        let path = parse_path(&self.derivation)?;
        let signed = device.sign_message(&path, self.message.as_bytes())?;
        Ok(Report::map([
            (
                "address",
                Report::text(format!("0x{}", hex::encode(signed.address.as_slice()))),
            ),
            (
                "signature",
                Report::bytes(signed.signature, ByteEncoding::Base64),
            ),
        ]))
    }
}
