//! Hex normalization for addresses and calldata.
//!
//! CLI hex input may carry an optional `0x`/`0X` prefix. Decoding is
//! strict: odd-length or non-hex input is rejected before any network
//! access, and an empty string decodes to no bytes (no payload).

use alloy_primitives::{hex, Address};
use devgate_core::error::ValidationError;

/// Strip an optional `0x`/`0X` prefix.
#[must_use]
pub fn strip_prefix(input: &str) -> &str {
    input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input)
}

/// Decode hex input with an optional `0x`/`0X` prefix.
///
/// An empty string (or a bare prefix) decodes to an empty byte vector.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidHex`] for odd-length or non-hex
/// input; `context` names the field being decoded.
pub fn decode(input: &str, context: &str) -> Result<Vec<u8>, ValidationError> {
    let stripped = strip_prefix(input);
    hex::decode(stripped)
        .map_err(|e| ValidationError::invalid_hex(format!("{context}: {e}")))
}

/// Decode a 20-byte Ethereum address with an optional `0x`/`0X` prefix.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidHex`] for malformed hex or a length
/// other than 20 bytes.
pub fn decode_address(input: &str, context: &str) -> Result<Address, ValidationError> {
    let bytes = decode(input, context)?;
    if bytes.len() != Address::len_bytes() {
        return Err(ValidationError::invalid_hex(format!(
            "{context}: expected 20 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(Address::from_slice(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_prefix_variants() {
        assert_eq!(decode("0xdeadbeef", "data").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(decode("0Xdeadbeef", "data").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(decode("deadbeef", "data").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_empty_means_no_payload() {
        assert_eq!(decode("", "data").unwrap(), Vec::<u8>::new());
        assert_eq!(decode("0x", "data").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_odd_length_rejects() {
        let err = decode("0xabc", "data").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidHex { .. }));
    }

    #[test]
    fn test_non_hex_rejects() {
        for input in ["0xzz", "hello!", "0x12g4"] {
            assert!(decode(input, "data").is_err(), "{input}");
        }
    }

    #[test]
    fn test_address_length_enforced() {
        let addr = decode_address(
            "0x3535353535353535353535353535353535353535",
            "to",
        )
        .unwrap();
        assert_eq!(addr.as_slice(), &[0x35u8; 20]);

        assert!(decode_address("0x353535", "to").is_err());
        assert!(decode_address("", "to").is_err());
    }

    proptest! {
        // decode ∘ encode is the identity on arbitrary byte strings,
        // with or without the 0x prefix.
        #[test]
        fn prop_decode_encode_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let encoded = hex::encode(&bytes);
            prop_assert_eq!(decode(&encoded, "t").unwrap(), bytes.clone());
            prop_assert_eq!(decode(&format!("0x{encoded}"), "t").unwrap(), bytes);
        }

        // Odd-length hex always rejects.
        #[test]
        fn prop_odd_length_rejects(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut encoded = hex::encode(&bytes);
            encoded.push('a');
            prop_assert!(decode(&encoded, "t").is_err());
        }
    }
}
