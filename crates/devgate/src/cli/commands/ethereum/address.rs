//! The `devgate ethereum address` command.

use devgate_core::error::DevgateError;
use devgate_core::report::Report;
use devgate_device::path::parse_path;
use devgate_device::DeviceClient;

/// Display the address for a derivation path.
///
/// The address comes from the device's derivation call — it is never
/// computed locally — and renders as `0x` + lowercase hex in both
/// output modes.
#[derive(Debug, Clone)]
pub struct AddressCommand {
    /// Derivation path string selecting the key.
    pub derivation: String,
}

impl AddressCommand {
    /// Run the command against an open session.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed derivation path and
    /// propagates device failures.
    pub fn run(&self, device: &mut dyn DeviceClient) -> Result<Report, DevgateError> {
        let path = parse_path(&self.derivation)?;
        let address = device.derive_address(&path)?;
        Ok(Report::text(format!(
            "0x{}",
            hex::encode(address.as_slice())
        )))
    }
}
