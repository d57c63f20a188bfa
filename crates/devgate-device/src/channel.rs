//! Device Channel implementations.
//!
//! A [`DeviceChannel`] carries protocol frames to and from the hardware
//! unit. Four concrete channels back the four transport kinds: HID
//! reports for USB, datagrams for the emulator's UDP port, a local Unix
//! stream socket, and HTTP calls through the bridge daemon.
//!
//! All I/O is synchronous. Reads carry a generous timeout because the
//! device blocks while the user confirms an action on it.

#[cfg(unix)]
use std::io::{Read, Write};
use std::net::UdpSocket;
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::time::Duration;

use devgate_core::error::DeviceError;

use crate::wire::{Frame, HEADER_LEN};

/// How long a read waits for the device. Interactive confirmations
/// happen on the device, so this is minutes, not seconds.
const READ_TIMEOUT: Duration = Duration::from_secs(300);

/// HID report size used by the USB channel (excluding the report id).
const REPORT_SIZE: usize = 64;

/// Bidirectional frame stream to the hardware unit.
///
/// Exclusively owned by the single in-flight command for the process
/// lifetime; there is no pooling or cross-invocation reuse.
pub trait DeviceChannel: Send {
    /// Send one request frame and block for the response frame.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] on transport I/O failures or malformed
    /// frames.
    fn exchange(&mut self, frame: &Frame) -> Result<Frame, DeviceError>;
}

// ============================================================================
// UDP (emulator)
// ============================================================================

/// Datagram channel to a device emulator.
#[derive(Debug)]
pub struct UdpChannel {
    socket: UdpSocket,
}

impl UdpChannel {
    /// Connect to the emulator at `addr` (`host:port`).
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Transport`] if the socket cannot be bound
    /// or connected.
    pub fn connect(addr: &str) -> Result<Self, DeviceError> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .map_err(|e| DeviceError::transport(format!("udp bind: {e}")))?;
        socket
            .connect(addr)
            .map_err(|e| DeviceError::transport(format!("udp connect {addr}: {e}")))?;
        socket
            .set_read_timeout(Some(READ_TIMEOUT))
            .map_err(|e| DeviceError::transport(format!("udp timeout: {e}")))?;
        Ok(Self { socket })
    }
}

impl DeviceChannel for UdpChannel {
    fn exchange(&mut self, frame: &Frame) -> Result<Frame, DeviceError> {
        self.socket
            .send(&frame.encode())
            .map_err(|e| DeviceError::transport(format!("udp send: {e}")))?;

        let mut buf = vec![0u8; HEADER_LEN + crate::wire::MAX_UDP_PAYLOAD];
        let received = self
            .socket
            .recv(&mut buf)
            .map_err(|e| DeviceError::transport(format!("udp recv: {e}")))?;
        Frame::decode(&buf[..received])
    }
}

// ============================================================================
// Pipe (local stream socket)
// ============================================================================

/// Stream channel over a local Unix socket.
#[cfg(unix)]
#[derive(Debug)]
pub struct PipeChannel {
    stream: UnixStream,
}

#[cfg(unix)]
impl PipeChannel {
    /// Connect to the socket at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Transport`] if the socket cannot be
    /// opened.
    pub fn connect(path: &str) -> Result<Self, DeviceError> {
        let stream = UnixStream::connect(path)
            .map_err(|e| DeviceError::transport(format!("pipe connect {path}: {e}")))?;
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .map_err(|e| DeviceError::transport(format!("pipe timeout: {e}")))?;
        Ok(Self { stream })
    }
}

#[cfg(unix)]
impl DeviceChannel for PipeChannel {
    fn exchange(&mut self, frame: &Frame) -> Result<Frame, DeviceError> {
        self.stream
            .write_all(&frame.encode())
            .map_err(|e| DeviceError::transport(format!("pipe write: {e}")))?;

        let mut header = [0u8; HEADER_LEN];
        self.stream
            .read_exact(&mut header)
            .map_err(|e| DeviceError::transport(format!("pipe read: {e}")))?;
        let (kind, len) = Frame::parse_header(&header)?;

        let mut payload = vec![0u8; len];
        self.stream
            .read_exact(&mut payload)
            .map_err(|e| DeviceError::transport(format!("pipe read: {e}")))?;
        Ok(Frame::new(kind, payload))
    }
}

// ============================================================================
// USB (HID reports)
// ============================================================================

/// HID channel to a physical device.
///
/// Frames are chunked into fixed-size reports on the way out and
/// reassembled on the way in.
pub struct UsbChannel {
    device: hidapi::HidDevice,
}

impl UsbChannel {
    /// Wrap an open HID device.
    #[must_use]
    pub fn new(device: hidapi::HidDevice) -> Self {
        Self { device }
    }
}

impl DeviceChannel for UsbChannel {
    fn exchange(&mut self, frame: &Frame) -> Result<Frame, DeviceError> {
        let encoded = frame.encode();
        for chunk in encoded.chunks(REPORT_SIZE) {
            let mut report = Vec::with_capacity(REPORT_SIZE + 1);
            report.push(0x00); // report id
            report.extend_from_slice(chunk);
            report.resize(REPORT_SIZE + 1, 0x00);
            self.device
                .write(&report)
                .map_err(|e| DeviceError::transport(format!("hid write: {e}")))?;
        }

        let timeout = i32::try_from(READ_TIMEOUT.as_millis()).unwrap_or(i32::MAX);
        let mut assembled: Vec<u8> = Vec::new();
        let mut expected = None;
        loop {
            let mut report = [0u8; REPORT_SIZE];
            let received = self
                .device
                .read_timeout(&mut report, timeout)
                .map_err(|e| DeviceError::transport(format!("hid read: {e}")))?;
            if received == 0 {
                return Err(DeviceError::transport("hid read timed out"));
            }
            assembled.extend_from_slice(&report[..received]);

            if expected.is_none() && assembled.len() >= HEADER_LEN {
                let (_, len) = Frame::parse_header(&assembled)?;
                expected = Some(HEADER_LEN + len);
            }
            if let Some(total) = expected {
                if assembled.len() >= total {
                    return Frame::decode(&assembled[..total]);
                }
            }
        }
    }
}

// ============================================================================
// Bridge (HTTP daemon)
// ============================================================================

/// Channel through the local bridge daemon.
///
/// The bridge holds the device; frames travel hex-encoded over HTTP
/// against an acquired session.
#[derive(Debug)]
pub struct BridgeChannel {
    client: reqwest::blocking::Client,
    base_url: String,
    session: String,
}

impl BridgeChannel {
    /// Create a channel for an acquired bridge session.
    #[must_use]
    pub fn new(client: reqwest::blocking::Client, base_url: String, session: String) -> Self {
        Self {
            client,
            base_url,
            session,
        }
    }
}

impl DeviceChannel for BridgeChannel {
    fn exchange(&mut self, frame: &Frame) -> Result<Frame, DeviceError> {
        let url = format!("{}/call/{}", self.base_url, self.session);
        let body = hex::encode(frame.encode());
        let response = self
            .client
            .post(&url)
            .body(body)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| DeviceError::transport(format!("bridge call: {e}")))?;
        let text = response
            .text()
            .map_err(|e| DeviceError::transport(format!("bridge response: {e}")))?;
        let bytes = hex::decode(text.trim())
            .map_err(|e| DeviceError::frame(format!("bridge response hex: {e}")))?;
        Frame::decode(&bytes)
    }
}
