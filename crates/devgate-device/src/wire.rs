//! Wire frame codec.
//!
//! Every protocol message crosses the Device Channel as one frame:
//! a fixed 8-byte header (magic, message kind, payload length) followed
//! by the payload bytes. The payload encoding itself belongs to the
//! protocol layer in [`client`](crate::client); this module only frames
//! and unframes byte strings.

use devgate_core::error::DeviceError;

/// Frame magic, first two bytes of every header.
pub const FRAME_MAGIC: [u8; 2] = [0x23, 0x23];

/// Fixed header length: magic (2) + kind (2) + payload length (4).
pub const HEADER_LEN: usize = 8;

/// Upper bound on payload size. Firmware images pass through here, so
/// the cap is generous; anything larger is a framing bug.
pub const MAX_PAYLOAD: usize = 32 * 1024 * 1024;

/// Largest payload that fits a single emulator datagram.
pub const MAX_UDP_PAYLOAD: usize = 64 * 1024;

/// A single protocol message frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message kind tag.
    pub kind: u16,
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Create a frame.
    #[must_use]
    pub fn new(kind: u16, payload: Vec<u8>) -> Self {
        Self { kind, payload }
    }

    /// Serialize the frame as header plus payload.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.payload.len());
        out.extend_from_slice(&FRAME_MAGIC);
        out.extend_from_slice(&self.kind.to_be_bytes());
        out.extend_from_slice(&u32::try_from(self.payload.len()).unwrap_or(0).to_be_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    /// Parse a header, returning the message kind and payload length.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Frame`] on bad magic or an oversized
    /// payload length.
    pub fn parse_header(header: &[u8]) -> Result<(u16, usize), DeviceError> {
        if header.len() < HEADER_LEN {
            return Err(DeviceError::frame(format!(
                "header truncated to {} bytes",
                header.len()
            )));
        }
        if header[..2] != FRAME_MAGIC {
            return Err(DeviceError::frame("bad magic"));
        }
        let kind = u16::from_be_bytes([header[2], header[3]]);
        let len = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;
        if len > MAX_PAYLOAD {
            return Err(DeviceError::frame(format!("payload length {len} too large")));
        }
        Ok((kind, len))
    }

    /// Parse a complete frame from a byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Frame`] on a malformed header or a payload
    /// length that disagrees with the buffer.
    pub fn decode(bytes: &[u8]) -> Result<Self, DeviceError> {
        let (kind, len) = Self::parse_header(bytes)?;
        let payload = bytes
            .get(HEADER_LEN..HEADER_LEN + len)
            .ok_or_else(|| DeviceError::frame("payload truncated"))?;
        Ok(Self::new(kind, payload.to_vec()))
    }
}
