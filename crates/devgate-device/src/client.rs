//! Device protocol client.
//!
//! [`DeviceClient`] is the typed RPC boundary to the hardware unit:
//! address derivation, message and transaction signing, settings,
//! entropy and feature queries, and the firmware-upload entry point.
//! Every call may fail with a device status code and message, surfaced
//! as [`DeviceError::Protocol`] and propagated to the process exit
//! status.
//!
//! [`WireClient`] is the production implementation, speaking JSON
//! payloads in [`Frame`]s over any [`DeviceChannel`]. Tests substitute
//! their own `DeviceClient` and never touch a transport.

use alloy_primitives::{Address, U256};
use devgate_chain::tx::{Signature, TxRequest};
use devgate_core::error::DeviceError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::channel::DeviceChannel;
use crate::transport::{resolve, TransportKind};
use crate::wire::Frame;

/// Protocol message kind tags.
pub mod kinds {
    /// Reset the protocol state; the device answers with `FEATURES`.
    pub const INITIALIZE: u16 = 0;
    /// Generic success acknowledgement.
    pub const SUCCESS: u16 = 2;
    /// In-protocol failure report.
    pub const FAILURE: u16 = 3;
    /// Erase staged firmware before an upload.
    pub const FIRMWARE_ERASE: u16 = 6;
    /// Stream a validated firmware image.
    pub const FIRMWARE_UPLOAD: u16 = 7;
    /// Request device-generated entropy.
    pub const GET_ENTROPY: u16 = 9;
    /// Entropy response.
    pub const ENTROPY: u16 = 10;
    /// Feature/settings report.
    pub const FEATURES: u16 = 17;
    /// Apply settings (label and friends).
    pub const APPLY_SETTINGS: u16 = 25;
    /// Sign a personal message.
    pub const SIGN_MESSAGE: u16 = 38;
    /// Message signature response.
    pub const MESSAGE_SIGNATURE: u16 = 40;
    /// Query features without resetting state.
    pub const GET_FEATURES: u16 = 55;
    /// Derive an Ethereum address.
    pub const ETH_GET_ADDRESS: u16 = 56;
    /// Derived address response.
    pub const ETH_ADDRESS: u16 = 57;
    /// Sign an Ethereum transaction.
    pub const ETH_SIGN_TX: u16 = 58;
    /// Transaction signature response.
    pub const ETH_TX_SIGNATURE: u16 = 59;
}

/// Well-known device failure codes.
pub mod failure_codes {
    /// The message was not expected in the current state.
    pub const UNEXPECTED_MESSAGE: u32 = 1;
    /// The request payload was malformed.
    pub const DATA_ERROR: u32 = 3;
    /// The user cancelled the action on the device.
    pub const ACTION_CANCELLED: u32 = 4;
    /// The PIN was rejected.
    pub const PIN_INVALID: u32 = 5;
    /// The firmware image was rejected by the device.
    pub const FIRMWARE_ERROR: u32 = 9;
}

/// Device feature/settings report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    /// Vendor string.
    pub vendor: String,
    /// Model name.
    pub model: String,
    /// User-assigned label, if set.
    pub label: Option<String>,
    /// Firmware major version.
    pub major_version: u32,
    /// Firmware minor version.
    pub minor_version: u32,
    /// Firmware patch version.
    pub patch_version: u32,
    /// Whether the device holds a seed.
    pub initialized: bool,
    /// Stable device identifier.
    pub device_id: String,
}

/// A signed personal message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSignature {
    /// Address of the signing key.
    pub address: Address,
    /// The signature envelope bytes.
    pub signature: Vec<u8>,
}

/// Settings to apply on the device.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsRequest {
    /// New device label.
    pub label: Option<String>,
}

/// Typed RPC boundary to the hardware signing device.
pub trait DeviceClient {
    /// Query the device feature report.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] on transport or protocol failure.
    fn features(&mut self) -> Result<Features, DeviceError>;

    /// Derive the address for a derivation path.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] on transport or protocol failure.
    fn derive_address(&mut self, path: &[u32]) -> Result<Address, DeviceError>;

    /// Sign a personal message with the key at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] on transport or protocol failure,
    /// including user cancellation on the device.
    fn sign_message(&mut self, path: &[u32], message: &[u8])
        -> Result<MessageSignature, DeviceError>;

    /// Sign a fully resolved transaction with the key at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] on transport or protocol failure,
    /// including user cancellation on the device.
    fn sign_transaction(
        &mut self,
        path: &[u32],
        request: &TxRequest,
    ) -> Result<Signature, DeviceError>;

    /// Request `size` bytes of device-generated entropy.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] on transport or protocol failure.
    fn get_entropy(&mut self, size: u32) -> Result<Vec<u8>, DeviceError>;

    /// Apply settings; returns the device's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] on transport or protocol failure.
    fn apply_settings(&mut self, settings: &SettingsRequest) -> Result<String, DeviceError>;

    /// Stream a validated firmware image to the device.
    ///
    /// The device performs its own interactive confirmation before
    /// accepting the transfer; this call only prepares and streams the
    /// bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] on transport or protocol failure,
    /// including user cancellation on the device.
    fn firmware_update(&mut self, image: &[u8]) -> Result<(), DeviceError>;
}

// ============================================================================
// Wire payloads
// ============================================================================

#[derive(Serialize)]
struct Empty {}

#[derive(Serialize)]
struct PathRequest<'a> {
    address_n: &'a [u32],
}

#[derive(Deserialize)]
struct AddressResponse {
    address: String,
}

#[derive(Serialize)]
struct SignMessageRequest<'a> {
    address_n: &'a [u32],
    message: String,
}

#[derive(Deserialize)]
struct MessageSignatureResponse {
    address: String,
    signature: String,
}

#[derive(Serialize)]
struct EthSignTxRequest<'a> {
    address_n: &'a [u32],
    nonce: u64,
    gas_price: String,
    gas_limit: u64,
    to: String,
    value: String,
    data: String,
    chain_id: u64,
}

#[derive(Deserialize)]
struct EthTxSignatureResponse {
    v: u64,
    r: String,
    s: String,
}

#[derive(Serialize)]
struct EntropyRequest {
    size: u32,
}

#[derive(Deserialize)]
struct EntropyResponse {
    entropy: String,
}

#[derive(Deserialize)]
struct SuccessResponse {
    message: String,
}

#[derive(Serialize)]
struct FirmwareUploadRequest {
    image: String,
}

#[derive(Deserialize)]
struct FailureResponse {
    code: u32,
    message: String,
}

// ============================================================================
// WireClient
// ============================================================================

/// Production [`DeviceClient`] speaking frames over a channel.
///
/// The Device Session: owns the channel exclusively for one process
/// invocation.
pub struct WireClient {
    channel: Box<dyn DeviceChannel>,
}

impl WireClient {
    /// Resolve a transport and open a session.
    ///
    /// Sends an initialize message so the device drops any state left by
    /// a previous session.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError`] if transport resolution, the handshake,
    /// or the feature exchange fails.
    pub fn open(kind: TransportKind, path: &str) -> Result<Self, DeviceError> {
        let channel = resolve(kind, path)?;
        let mut client = Self::from_channel(channel);
        let features: Features = client.call(kinds::INITIALIZE, &Empty {}, kinds::FEATURES)?;
        tracing::debug!(
            vendor = %features.vendor,
            model = %features.model,
            "device session opened"
        );
        Ok(client)
    }

    /// Wrap an already-open channel without the initialize handshake.
    #[must_use]
    pub fn from_channel(channel: Box<dyn DeviceChannel>) -> Self {
        Self { channel }
    }

    fn call<Req: Serialize, Resp: DeserializeOwned>(
        &mut self,
        kind: u16,
        request: &Req,
        expect: u16,
    ) -> Result<Resp, DeviceError> {
        let payload = serde_json::to_vec(request)
            .map_err(|e| DeviceError::frame(format!("encode payload: {e}")))?;
        let response = self.channel.exchange(&Frame::new(kind, payload))?;

        if response.kind == kinds::FAILURE {
            let failure: FailureResponse = serde_json::from_slice(&response.payload)
                .map_err(|e| DeviceError::frame(format!("decode failure payload: {e}")))?;
            return Err(DeviceError::protocol(failure.code, failure.message));
        }
        if response.kind != expect {
            return Err(DeviceError::frame(format!(
                "unexpected message kind {} (wanted {expect})",
                response.kind
            )));
        }
        serde_json::from_slice(&response.payload)
            .map_err(|e| DeviceError::frame(format!("decode payload: {e}")))
    }
}

impl DeviceClient for WireClient {
    fn features(&mut self) -> Result<Features, DeviceError> {
        self.call(kinds::GET_FEATURES, &Empty {}, kinds::FEATURES)
    }

    fn derive_address(&mut self, path: &[u32]) -> Result<Address, DeviceError> {
        let response: AddressResponse = self.call(
            kinds::ETH_GET_ADDRESS,
            &PathRequest { address_n: path },
            kinds::ETH_ADDRESS,
        )?;
        parse_address(&response.address)
    }

    fn sign_message(
        &mut self,
        path: &[u32],
        message: &[u8],
    ) -> Result<MessageSignature, DeviceError> {
        let response: MessageSignatureResponse = self.call(
            kinds::SIGN_MESSAGE,
            &SignMessageRequest {
                address_n: path,
                message: hex::encode(message),
            },
            kinds::MESSAGE_SIGNATURE,
        )?;
        Ok(MessageSignature {
            address: parse_address(&response.address)?,
            signature: hex::decode(&response.signature)
                .map_err(|e| DeviceError::frame(format!("signature hex: {e}")))?,
        })
    }

    fn sign_transaction(
        &mut self,
        path: &[u32],
        request: &TxRequest,
    ) -> Result<Signature, DeviceError> {
        let response: EthTxSignatureResponse = self.call(
            kinds::ETH_SIGN_TX,
            &EthSignTxRequest {
                address_n: path,
                nonce: request.nonce,
                gas_price: request.gas_price.to_string(),
                gas_limit: request.gas_limit,
                to: format!("0x{}", hex::encode(request.to.as_slice())),
                value: request.value.to_string(),
                data: hex::encode(&request.data),
                chain_id: request.chain_id,
            },
            kinds::ETH_TX_SIGNATURE,
        )?;
        Ok(Signature {
            v: response.v,
            r: parse_signature_word(&response.r, "r")?,
            s: parse_signature_word(&response.s, "s")?,
        })
    }

    fn get_entropy(&mut self, size: u32) -> Result<Vec<u8>, DeviceError> {
        let response: EntropyResponse =
            self.call(kinds::GET_ENTROPY, &EntropyRequest { size }, kinds::ENTROPY)?;
        hex::decode(&response.entropy)
            .map_err(|e| DeviceError::frame(format!("entropy hex: {e}")))
    }

    fn apply_settings(&mut self, settings: &SettingsRequest) -> Result<String, DeviceError> {
        let response: SuccessResponse =
            self.call(kinds::APPLY_SETTINGS, settings, kinds::SUCCESS)?;
        Ok(response.message)
    }

    fn firmware_update(&mut self, image: &[u8]) -> Result<(), DeviceError> {
        let _: SuccessResponse = self.call(kinds::FIRMWARE_ERASE, &Empty {}, kinds::SUCCESS)?;
        let _: SuccessResponse = self.call(
            kinds::FIRMWARE_UPLOAD,
            &FirmwareUploadRequest {
                image: hex::encode(image),
            },
            kinds::SUCCESS,
        )?;
        Ok(())
    }
}

fn parse_address(text: &str) -> Result<Address, DeviceError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let bytes =
        hex::decode(digits).map_err(|e| DeviceError::frame(format!("address hex: {e}")))?;
    if bytes.len() != Address::len_bytes() {
        return Err(DeviceError::frame(format!(
            "address is {} bytes, wanted 20",
            bytes.len()
        )));
    }
    Ok(Address::from_slice(&bytes))
}

fn parse_signature_word(text: &str, which: &str) -> Result<U256, DeviceError> {
    let bytes =
        hex::decode(text).map_err(|e| DeviceError::frame(format!("signature {which}: {e}")))?;
    if bytes.len() != 32 {
        return Err(DeviceError::frame(format!(
            "signature {which} is {} bytes, wanted 32",
            bytes.len()
        )));
    }
    Ok(U256::from_be_slice(&bytes))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use alloy_primitives::Bytes;
    use serde_json::json;

    use super::*;

    /// Channel scripted with canned response frames.
    struct ScriptedChannel {
        requests: Vec<Frame>,
        responses: VecDeque<Frame>,
    }

    impl ScriptedChannel {
        fn new(responses: Vec<Frame>) -> Self {
            Self {
                requests: Vec::new(),
                responses: responses.into(),
            }
        }
    }

    impl DeviceChannel for ScriptedChannel {
        fn exchange(&mut self, frame: &Frame) -> Result<Frame, DeviceError> {
            self.requests.push(frame.clone());
            self.responses
                .pop_front()
                .ok_or_else(|| DeviceError::transport("script exhausted"))
        }
    }

    fn json_frame(kind: u16, value: serde_json::Value) -> Frame {
        Frame::new(kind, serde_json::to_vec(&value).unwrap())
    }

    fn client_with(responses: Vec<Frame>) -> WireClient {
        WireClient::from_channel(Box::new(ScriptedChannel::new(responses)))
    }

    #[test]
    fn test_features_roundtrip() {
        let mut client = client_with(vec![json_frame(
            kinds::FEATURES,
            json!({
                "vendor": "devgate",
                "model": "DG-1",
                "label": "ops key",
                "major_version": 2,
                "minor_version": 4,
                "patch_version": 1,
                "initialized": true,
                "device_id": "A1B2C3",
            }),
        )]);

        let features = client.features().unwrap();
        assert_eq!(features.model, "DG-1");
        assert_eq!(features.label.as_deref(), Some("ops key"));
        assert!(features.initialized);
    }

    #[test]
    fn test_failure_maps_to_protocol_error() {
        let mut client = client_with(vec![json_frame(
            kinds::FAILURE,
            json!({"code": failure_codes::ACTION_CANCELLED, "message": "cancelled on device"}),
        )]);

        let err = client.derive_address(&[0]).unwrap_err();
        match err {
            DeviceError::Protocol { code, message } => {
                assert_eq!(code, failure_codes::ACTION_CANCELLED);
                assert_eq!(message, "cancelled on device");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_kind_is_frame_error() {
        let mut client = client_with(vec![json_frame(kinds::ENTROPY, json!({"entropy": "00"}))]);
        let err = client.features().unwrap_err();
        assert!(matches!(err, DeviceError::Frame { .. }));
    }

    #[test]
    fn test_derive_address_parses_hex() {
        let mut client = client_with(vec![json_frame(
            kinds::ETH_ADDRESS,
            json!({"address": "0x3535353535353535353535353535353535353535"}),
        )]);
        let address = client.derive_address(&[44, 60]).unwrap();
        assert_eq!(address, Address::from([0x35u8; 20]));
    }

    #[test]
    fn test_sign_transaction_parses_components() {
        let mut client = client_with(vec![json_frame(
            kinds::ETH_TX_SIGNATURE,
            json!({
                "v": 37,
                "r": "28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276",
                "s": "67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83",
            }),
        )]);

        let request = TxRequest {
            nonce: 9,
            gas_price: U256::from(20_000_000_000u64),
            gas_limit: 21_000,
            to: Address::from([0x35u8; 20]),
            value: U256::from(1_000_000_000_000_000_000u64),
            data: Bytes::new(),
            chain_id: 1,
        };
        let signature = client.sign_transaction(&[0], &request).unwrap();
        assert_eq!(signature.v, 37);
        assert_eq!(
            signature.r,
            U256::from_str_radix(
                "28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276",
                16
            )
            .unwrap()
        );
    }

    #[test]
    fn test_sign_transaction_rejects_short_r() {
        let mut client = client_with(vec![json_frame(
            kinds::ETH_TX_SIGNATURE,
            json!({"v": 27, "r": "abcd", "s": "abcd"}),
        )]);

        let request = TxRequest {
            nonce: 0,
            gas_price: U256::ZERO,
            gas_limit: 0,
            to: Address::ZERO,
            value: U256::ZERO,
            data: Bytes::new(),
            chain_id: 1,
        };
        let err = client.sign_transaction(&[0], &request).unwrap_err();
        assert!(matches!(err, DeviceError::Frame { .. }));
    }

    #[test]
    fn test_firmware_update_erases_then_uploads() {
        let mut client = client_with(vec![
            json_frame(kinds::SUCCESS, json!({"message": "erased"})),
            json_frame(kinds::SUCCESS, json!({"message": "installed"})),
        ]);
        client.firmware_update(&[0x44, 0x47, 0x46, 0x57]).unwrap();
    }

    #[test]
    fn test_entropy_decodes_hex() {
        let mut client = client_with(vec![json_frame(
            kinds::ENTROPY,
            json!({"entropy": "00ff10"}),
        )]);
        assert_eq!(client.get_entropy(3).unwrap(), vec![0x00, 0xff, 0x10]);
    }
}
