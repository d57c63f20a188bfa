//! The `devgate firmware-update` command.

use devgate_core::error::{DevgateError, FirmwareError};
use devgate_core::report::Report;
use devgate_device::DeviceClient;
use devgate_firmware::{acquire, fingerprint, validate, FirmwareSelector};

/// Acquire a firmware image, validate it, and stream it to the device.
///
/// The device performs its own interactive confirmation before
/// accepting the transfer; this command only prepares and streams the
/// bytes.
#[derive(Debug, Clone)]
pub struct FirmwareUpdateCommand {
    /// Which source to acquire the image from.
    pub selector: FirmwareSelector,
    /// Skip header validation and fingerprint verification.
    pub skip_check: bool,
    /// Release catalog URL.
    pub catalog_url: String,
}

impl FirmwareUpdateCommand {
    /// Run the pipeline against an open session.
    ///
    /// # Errors
    ///
    /// Returns firmware errors for an invalid image, an unknown catalog
    /// version, or a fingerprint mismatch; service errors for fetch
    /// failures; device errors from the upload itself.
    pub fn run(&self, device: &mut dyn DeviceClient) -> Result<Report, DevgateError> {
        let candidate = acquire(&self.selector, &self.catalog_url)?;

        let image = if self.skip_check {
            tracing::warn!("firmware validation skipped");
            candidate.bytes
        } else {
            validate(&candidate.bytes)?
        };

        let digest = fingerprint(&image);
        if !self.skip_check {
            if let Some(expected) = &candidate.fingerprint {
                if *expected != digest {
                    return Err(FirmwareError::FingerprintMismatch {
                        expected: expected.clone(),
                        actual: digest,
                    }
                    .into());
                }
            }
        }

        tracing::info!(bytes = image.len(), fingerprint = %digest, "uploading firmware");
        device.firmware_update(&image)?;

        let mut fields = vec![("status".to_string(), Report::text("firmware upload complete"))];
        if let Some(version) = candidate.version {
            fields.push(("version".to_string(), Report::text(version)));
        }
        fields.push(("fingerprint".to_string(), Report::text(digest)));
        Ok(Report::Map(fields))
    }
}
