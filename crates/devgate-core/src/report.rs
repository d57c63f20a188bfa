//! Output rendering for command results.
//!
//! Every command handler returns a [`Report`]: an ordered tree of text,
//! integers, byte strings, lists, and maps. The dispatcher renders the
//! tree either as human-readable text or as JSON, selected by the global
//! output-format flag. Rendering is deterministic in both modes: maps
//! preserve insertion order and byte strings have a fixed encoding chosen
//! by the handler.
//!
//! Byte strings render as lowercase hex by default. Fields the handler
//! designates as encoded envelopes (message signatures, encrypted
//! payloads) render as base64 instead. This convention is observable at
//! the CLI boundary and must be preserved.
//!
//! # Example
//!
//! ```
//! use devgate_core::report::{ByteEncoding, Report};
//!
//! let report = Report::map([
//!     ("address", Report::text("0x1d1c328764a41bda0492b66baa30c4a339ff85ef")),
//!     ("signature", Report::bytes(vec![0xde, 0xad], ByteEncoding::Base64)),
//! ]);
//! assert_eq!(
//!     report.render_text(),
//!     "address: 0x1d1c328764a41bda0492b66baa30c4a339ff85ef\nsignature: 3q0=\n"
//! );
//! ```

use base64::Engine;
use serde_json::{json, Value};

/// Encoding used when rendering a byte string at the output boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteEncoding {
    /// Lowercase hex, no prefix. The default for binary fields.
    Hex,
    /// Standard base64. Used for designated encoded envelopes such as
    /// message signatures and encrypted payloads.
    Base64,
}

/// A renderable command result.
///
/// Maps are ordered vectors of pairs so that both rendering modes are
/// deterministic without relying on hash-map iteration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// A plain text value.
    Text(String),
    /// An unsigned integer value.
    Uint(u64),
    /// A byte string with a fixed output encoding.
    Bytes {
        /// The raw bytes.
        data: Vec<u8>,
        /// How the bytes render at the boundary.
        encoding: ByteEncoding,
    },
    /// An ordered sequence of values.
    List(Vec<Report>),
    /// An ordered mapping of field name to value.
    Map(Vec<(String, Report)>),
}

impl Report {
    /// Create a text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Create a byte-string value with an explicit encoding.
    #[must_use]
    pub fn bytes(data: Vec<u8>, encoding: ByteEncoding) -> Self {
        Self::Bytes { data, encoding }
    }

    /// Create a byte-string value that renders as lowercase hex.
    #[must_use]
    pub fn hex(data: Vec<u8>) -> Self {
        Self::bytes(data, ByteEncoding::Hex)
    }

    /// Create an ordered map from `(name, value)` pairs.
    #[must_use]
    pub fn map<K: Into<String>, I: IntoIterator<Item = (K, Self)>>(pairs: I) -> Self {
        Self::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Render the report as a JSON value.
    ///
    /// Byte strings become JSON strings in their designated encoding.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Uint(n) => json!(n),
            Self::Bytes { data, encoding } => Value::String(encode_bytes(data, *encoding)),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(pairs) => Value::Object(
                pairs
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Render the report as human-readable text.
    ///
    /// Scalars render on a single line without a trailing newline. Maps
    /// render one `name: value` line per field; nested maps and lists
    /// indent by two spaces per level.
    #[must_use]
    pub fn render_text(&self) -> String {
        match self.scalar() {
            Some(s) => s,
            None => {
                let mut out = String::new();
                self.write_text(&mut out, 0);
                out
            }
        }
    }

    /// The single-line form of a scalar value, if this is one.
    fn scalar(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Uint(n) => Some(n.to_string()),
            Self::Bytes { data, encoding } => Some(encode_bytes(data, *encoding)),
            Self::List(_) | Self::Map(_) => None,
        }
    }

    fn write_text(&self, out: &mut String, indent: usize) {
        let pad = "  ".repeat(indent);
        match self {
            Self::Text(_) | Self::Uint(_) | Self::Bytes { .. } => {
                // Scalars inside containers always land via the arms below.
                if let Some(s) = self.scalar() {
                    out.push_str(&pad);
                    out.push_str(&s);
                    out.push('\n');
                }
            }
            Self::List(items) => {
                for item in items {
                    match item.scalar() {
                        Some(s) => {
                            out.push_str(&pad);
                            out.push_str("- ");
                            out.push_str(&s);
                            out.push('\n');
                        }
                        None => {
                            out.push_str(&pad);
                            out.push_str("-\n");
                            item.write_text(out, indent + 1);
                        }
                    }
                }
            }
            Self::Map(pairs) => {
                for (key, value) in pairs {
                    match value.scalar() {
                        Some(s) => {
                            out.push_str(&pad);
                            out.push_str(key);
                            out.push_str(": ");
                            out.push_str(&s);
                            out.push('\n');
                        }
                        None => {
                            out.push_str(&pad);
                            out.push_str(key);
                            out.push_str(":\n");
                            value.write_text(out, indent + 1);
                        }
                    }
                }
            }
        }
    }
}

fn encode_bytes(data: &[u8], encoding: ByteEncoding) -> String {
    match encoding {
        ByteEncoding::Hex => hex::encode(data),
        ByteEncoding::Base64 => base64::engine::general_purpose::STANDARD.encode(data),
    }
}

/// Build the JSON error envelope.
///
/// The envelope shape is distinct from every success payload: errors are
/// the only objects carrying a top-level `"error"` key.
#[must_use]
pub fn error_envelope(kind: &str, code: Option<u32>, message: &str) -> Value {
    json!({
        "error": {
            "kind": kind,
            "code": code,
            "message": message,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_text_renders_bare() {
        let report = Report::text("Signed raw transaction: 0xdeadbeef");
        assert_eq!(report.render_text(), "Signed raw transaction: 0xdeadbeef");
        assert_eq!(report.to_json(), json!("Signed raw transaction: 0xdeadbeef"));
    }

    #[test]
    fn test_bytes_default_to_lowercase_hex() {
        let report = Report::hex(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(report.render_text(), "deadbeef");
        assert_eq!(report.to_json(), json!("deadbeef"));
    }

    #[test]
    fn test_designated_envelope_renders_base64() {
        let report = Report::bytes(vec![1, 2, 3, 4], ByteEncoding::Base64);
        assert_eq!(report.render_text(), "AQIDBA==");
    }

    #[test]
    fn test_map_order_is_preserved() {
        let report = Report::map([
            ("zeta", Report::Uint(1)),
            ("alpha", Report::Uint(2)),
        ]);
        assert_eq!(report.render_text(), "zeta: 1\nalpha: 2\n");

        let json = serde_json::to_string(&report.to_json()).unwrap();
        let zeta = json.find("zeta").unwrap();
        let alpha = json.find("alpha").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn test_nested_map_indents() {
        let report = Report::map([
            ("device", Report::map([("model", Report::text("DG-1"))])),
            ("count", Report::Uint(1)),
        ]);
        assert_eq!(report.render_text(), "device:\n  model: DG-1\ncount: 1\n");
    }

    #[test]
    fn test_list_of_maps() {
        let report = Report::List(vec![
            Report::map([("path", Report::text("hid:0001"))]),
            Report::map([("path", Report::text("hid:0002"))]),
        ]);
        assert_eq!(
            report.render_text(),
            "-\n  path: hid:0001\n-\n  path: hid:0002\n"
        );
    }

    #[test]
    fn test_error_envelope_shape() {
        let envelope = error_envelope("device", Some(4), "action cancelled");
        assert_eq!(
            envelope,
            json!({"error": {"kind": "device", "code": 4, "message": "action cancelled"}})
        );
        // Success payloads never carry a top-level "error" key.
        assert!(envelope.get("error").is_some());
    }
}
