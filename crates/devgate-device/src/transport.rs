//! Transport resolution and device discovery.
//!
//! [`resolve`] turns a transport kind plus a path into an open
//! [`DeviceChannel`]. The enumerated kinds (USB, bridge) run a one-shot
//! discovery scan and select the first entry whose address matches the
//! path, with an empty path acting as a wildcard; the point-to-point
//! kinds (UDP, pipe) construct directly from the path, falling back to a
//! well-known local default when it is empty.
//!
//! The set of kinds is closed: anything else is unrepresentable in the
//! [`TransportKind`] enum, so the "unsupported transport" failure mode
//! of the protocol cannot occur past argument validation.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use devgate_core::error::DeviceError;
use serde::Deserialize;

use crate::channel::{BridgeChannel, DeviceChannel, UdpChannel, UsbChannel};

/// USB vendor id the discovery scan filters on.
pub const DEVICE_VENDOR_ID: u16 = 0x1209;

/// Default emulator address for the UDP transport.
pub const DEFAULT_UDP_ADDR: &str = "127.0.0.1:21324";

/// Default local socket path for the pipe transport.
pub const DEFAULT_PIPE_PATH: &str = "/tmp/devgate.sock";

/// Default bridge daemon URL.
pub const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:21325";

/// Timeout for bridge daemon HTTP calls during discovery and acquire.
const BRIDGE_TIMEOUT: Duration = Duration::from_secs(10);

/// The closed set of device transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Enumerated USB HID devices.
    Usb,
    /// Datagram link to a device emulator.
    Udp,
    /// Local stream socket.
    Pipe,
    /// Enumerated devices held by the local bridge daemon.
    Bridge,
}

impl TransportKind {
    /// Stable lowercase name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Usb => "usb",
            Self::Udp => "udp",
            Self::Pipe => "pipe",
            Self::Bridge => "bridge",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransportKind {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "usb" => Ok(Self::Usb),
            "udp" => Ok(Self::Udp),
            "pipe" => Ok(Self::Pipe),
            "bridge" => Ok(Self::Bridge),
            other => Err(DeviceError::transport(format!(
                "unknown transport kind: {other}"
            ))),
        }
    }
}

/// One discovered device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Transport the device was found on.
    pub transport: &'static str,
    /// Address usable as the `--path` value.
    pub path: String,
    /// Product string, when the transport reports one.
    pub product: Option<String>,
}

/// Resolve a transport kind and path into an open channel.
///
/// # Errors
///
/// Returns [`DeviceError::NotFound`] when an enumerated scan matches
/// nothing and [`DeviceError::Transport`] when the channel cannot be
/// opened.
pub fn resolve(kind: TransportKind, path: &str) -> Result<Box<dyn DeviceChannel>, DeviceError> {
    tracing::debug!(kind = %kind, path, "resolving transport");
    match kind {
        TransportKind::Usb => resolve_usb(path),
        TransportKind::Udp => {
            let addr = if path.is_empty() { DEFAULT_UDP_ADDR } else { path };
            Ok(Box::new(UdpChannel::connect(addr)?))
        }
        TransportKind::Pipe => resolve_pipe(path),
        TransportKind::Bridge => resolve_bridge(path),
    }
}

/// List discoverable devices for a transport kind.
///
/// The enumerated kinds scan once and may legitimately find nothing;
/// the point-to-point kinds have nothing to discover and return an
/// empty list.
///
/// # Errors
///
/// Returns [`DeviceError::Transport`] when the scan itself fails (the
/// HID subsystem is unavailable, the bridge daemon is unreachable).
pub fn enumerate(kind: TransportKind) -> Result<Vec<DeviceInfo>, DeviceError> {
    match kind {
        TransportKind::Usb => {
            let api = hid_api()?;
            Ok(usb_entries(&api))
        }
        TransportKind::Bridge => bridge_entries(&bridge_client()?, DEFAULT_BRIDGE_URL),
        TransportKind::Udp | TransportKind::Pipe => Ok(Vec::new()),
    }
}

/// Select the first entry whose address matches `path`.
///
/// An empty path is a wildcard matching the first entry; no match is a
/// [`DeviceError::NotFound`] for the transport.
fn select_entry(
    entries: Vec<DeviceInfo>,
    path: &str,
    transport: TransportKind,
) -> Result<DeviceInfo, DeviceError> {
    entries
        .into_iter()
        .find(|entry| path.is_empty() || entry.path == path)
        .ok_or_else(|| DeviceError::not_found(transport.name()))
}

// ============================================================================
// USB
// ============================================================================

fn hid_api() -> Result<hidapi::HidApi, DeviceError> {
    hidapi::HidApi::new().map_err(|e| DeviceError::transport(format!("hid init: {e}")))
}

fn usb_entries(api: &hidapi::HidApi) -> Vec<DeviceInfo> {
    api.device_list()
        .filter(|info| info.vendor_id() == DEVICE_VENDOR_ID)
        .map(|info| DeviceInfo {
            transport: TransportKind::Usb.name(),
            path: info.path().to_string_lossy().into_owned(),
            product: info.product_string().map(ToString::to_string),
        })
        .collect()
}

fn resolve_usb(path: &str) -> Result<Box<dyn DeviceChannel>, DeviceError> {
    let api = hid_api()?;
    let entry = select_entry(usb_entries(&api), path, TransportKind::Usb)?;
    let device = api
        .device_list()
        .find(|info| info.path().to_string_lossy() == entry.path)
        .ok_or_else(|| DeviceError::not_found(TransportKind::Usb.name()))?
        .open_device(&api)
        .map_err(|e| DeviceError::transport(format!("hid open: {e}")))?;
    Ok(Box::new(UsbChannel::new(device)))
}

// ============================================================================
// Pipe
// ============================================================================

#[cfg(unix)]
fn resolve_pipe(path: &str) -> Result<Box<dyn DeviceChannel>, DeviceError> {
    let path = effective_pipe_path(path);
    Ok(Box::new(crate::channel::PipeChannel::connect(path)?))
}

#[cfg(not(unix))]
fn resolve_pipe(_path: &str) -> Result<Box<dyn DeviceChannel>, DeviceError> {
    Err(DeviceError::transport(
        "pipe transport is only available on unix",
    ))
}

/// The pipe path, defaulting to the well-known local socket when empty.
#[must_use]
pub fn effective_pipe_path(path: &str) -> &str {
    if path.is_empty() {
        DEFAULT_PIPE_PATH
    } else {
        path
    }
}

// ============================================================================
// Bridge
// ============================================================================

#[derive(Debug, Deserialize)]
struct BridgeDevice {
    path: String,
    product: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BridgeSession {
    session: String,
}

fn bridge_client() -> Result<reqwest::blocking::Client, DeviceError> {
    reqwest::blocking::Client::builder()
        .timeout(BRIDGE_TIMEOUT)
        .build()
        .map_err(|e| DeviceError::transport(format!("bridge client: {e}")))
}

fn bridge_entries(
    client: &reqwest::blocking::Client,
    base_url: &str,
) -> Result<Vec<DeviceInfo>, DeviceError> {
    let url = format!("{base_url}/enumerate");
    let devices: Vec<BridgeDevice> = client
        .post(&url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .and_then(|r| r.json())
        .map_err(|e| DeviceError::transport(format!("bridge enumerate: {e}")))?;
    Ok(devices
        .into_iter()
        .map(|device| DeviceInfo {
            transport: TransportKind::Bridge.name(),
            path: device.path,
            product: device.product,
        })
        .collect())
}

fn resolve_bridge(path: &str) -> Result<Box<dyn DeviceChannel>, DeviceError> {
    let client = bridge_client()?;
    let entries = bridge_entries(&client, DEFAULT_BRIDGE_URL)?;
    let entry = select_entry(entries, path, TransportKind::Bridge)?;

    let url = format!("{DEFAULT_BRIDGE_URL}/acquire/{}", entry.path);
    let session: BridgeSession = client
        .post(&url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .and_then(|r| r.json())
        .map_err(|e| DeviceError::transport(format!("bridge acquire: {e}")))?;

    Ok(Box::new(BridgeChannel::new(
        client,
        DEFAULT_BRIDGE_URL.to_string(),
        session.session,
    )))
}
