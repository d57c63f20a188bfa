//! Device housekeeping commands: enumeration, features, entropy, and
//! settings.

use devgate_core::error::DevgateError;
use devgate_core::report::Report;
use devgate_device::client::SettingsRequest;
use devgate_device::{enumerate, DeviceClient, DeviceInfo, TransportKind};

/// The `devgate list-devices` command.
///
/// Enumeration pseudo-command: scans the enumerated transports once and
/// reports what was found, without ever opening a device session.
#[derive(Debug, Clone, Copy)]
pub struct ListDevicesCommand;

impl ListDevicesCommand {
    /// Run the scan.
    ///
    /// A transport whose scan fails outright (no HID subsystem, bridge
    /// daemon not running) is logged and skipped, so one dead transport
    /// does not hide devices on another. Zero results is a valid,
    /// empty listing.
    ///
    /// # Errors
    ///
    /// Currently infallible; the signature leaves room for a future
    /// strict mode.
    pub fn run(&self) -> Result<Report, DevgateError> {
        let mut found: Vec<DeviceInfo> = Vec::new();
        for kind in [TransportKind::Usb, TransportKind::Bridge] {
            match enumerate(kind) {
                Ok(entries) => found.extend(entries),
                Err(e) => tracing::warn!(transport = %kind, error = %e, "scan failed"),
            }
        }

        Ok(Report::List(
            found
                .into_iter()
                .map(|device| {
                    let mut fields = vec![
                        ("transport".to_string(), Report::text(device.transport)),
                        ("path".to_string(), Report::text(device.path)),
                    ];
                    if let Some(product) = device.product {
                        fields.push(("product".to_string(), Report::text(product)));
                    }
                    Report::Map(fields)
                })
                .collect(),
        ))
    }
}

/// The `devgate features` command.
#[derive(Debug, Clone, Copy)]
pub struct FeaturesCommand;

impl FeaturesCommand {
    /// Query and render the device feature report.
    ///
    /// # Errors
    ///
    /// Propagates device failures.
    pub fn run(&self, device: &mut dyn DeviceClient) -> Result<Report, DevgateError> {
        let features = device.features()?;
        let mut fields = vec![
            ("vendor".to_string(), Report::text(features.vendor)),
            ("model".to_string(), Report::text(features.model)),
            (
                "firmware".to_string(),
                Report::text(format!(
                    "{}.{}.{}",
                    features.major_version, features.minor_version, features.patch_version
                )),
            ),
        ];
        if let Some(label) = features.label {
            fields.push(("label".to_string(), Report::text(label)));
        }
        fields.push((
            "initialized".to_string(),
            Report::text(features.initialized.to_string()),
        ));
        fields.push(("device_id".to_string(), Report::text(features.device_id)));
        Ok(Report::Map(fields))
    }
}

/// The `devgate entropy` command.
#[derive(Debug, Clone, Copy)]
pub struct EntropyCommand {
    /// Number of bytes to request.
    pub length: u32,
}

impl EntropyCommand {
    /// Request entropy and render it as hex.
    ///
    /// # Errors
    ///
    /// Propagates device failures.
    pub fn run(&self, device: &mut dyn DeviceClient) -> Result<Report, DevgateError> {
        let entropy = device.get_entropy(self.length)?;
        Ok(Report::hex(entropy))
    }
}

/// The `devgate set-label` command.
#[derive(Debug, Clone)]
pub struct SetLabelCommand {
    /// The new label.
    pub label: String,
}

impl SetLabelCommand {
    /// Apply the label; the device confirms interactively.
    ///
    /// # Errors
    ///
    /// Propagates device failures, including user cancellation.
    pub fn run(&self, device: &mut dyn DeviceClient) -> Result<Report, DevgateError> {
        let message = device.apply_settings(&SettingsRequest {
            label: Some(self.label.clone()),
        })?;
        Ok(Report::text(message))
    }
}
