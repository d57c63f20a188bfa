//! Transaction model and canonical RLP encoding.
//!
//! A [`TxDraft`] holds what the caller supplied; fields stay `None` until
//! the enrichment pipeline resolves them. Signing consumes a
//! [`TxRequest`], where every field is concrete — so signing an
//! unresolved draft is unrepresentable rather than checked at runtime.
//!
//! The signed form serializes with the chain's canonical recursive
//! byte-list encoding: each scalar as minimal big-endian bytes (zero is
//! the empty byte string), each byte string length-prefixed, the whole
//! composed as one list. Deterministic, no padding.

use alloy_primitives::{Address, Bytes, U256};
use alloy_rlp::{BufMut, Encodable, Header};

/// A transaction as supplied by the caller, before enrichment.
///
/// `nonce`, `gas_price`, and `gas_limit` may be left unresolved; the
/// enrichment pipeline fills them from the external ledger service.
#[derive(Debug, Clone)]
pub struct TxDraft {
    /// Account nonce, if supplied.
    pub nonce: Option<u64>,
    /// Gas price in wei, if supplied.
    pub gas_price: Option<U256>,
    /// Gas limit, if supplied.
    pub gas_limit: Option<u64>,
    /// Recipient address.
    pub to: Address,
    /// Transferred value in wei.
    pub value: U256,
    /// Call payload; empty means a plain transfer.
    pub data: Bytes,
    /// Chain identifier for replay protection.
    pub chain_id: u64,
}

/// A fully resolved transaction, ready for device signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    /// Account nonce.
    pub nonce: u64,
    /// Gas price in wei.
    pub gas_price: U256,
    /// Gas limit.
    pub gas_limit: u64,
    /// Recipient address.
    pub to: Address,
    /// Transferred value in wei.
    pub value: U256,
    /// Call payload.
    pub data: Bytes,
    /// Chain identifier.
    pub chain_id: u64,
}

/// Signature components returned by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Recovery value, including any replay-protection offset.
    pub v: u64,
    /// Signature `r` component.
    pub r: U256,
    /// Signature `s` component.
    pub s: U256,
}

/// A signed transaction, serializable to canonical encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    /// The resolved transaction fields.
    pub request: TxRequest,
    /// The device-produced signature.
    pub signature: Signature,
}

impl SignedTx {
    /// The canonical wire bytes of the transaction.
    ///
    /// Encodes the ordered tuple (nonce, gas price, gas limit, to,
    /// value, data, v, r, s) as a single RLP list.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.length());
        self.encode(&mut out);
        out
    }

    fn rlp_payload_length(&self) -> usize {
        self.request.nonce.length()
            + self.request.gas_price.length()
            + self.request.gas_limit.length()
            + self.request.to.length()
            + self.request.value.length()
            + self.request.data.length()
            + self.signature.v.length()
            + self.signature.r.length()
            + self.signature.s.length()
    }
}

impl Encodable for SignedTx {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: self.rlp_payload_length(),
        }
        .encode(out);
        self.request.nonce.encode(out);
        self.request.gas_price.encode(out);
        self.request.gas_limit.encode(out);
        self.request.to.encode(out);
        self.request.value.encode(out);
        self.request.data.encode(out);
        self.signature.v.encode(out);
        self.signature.r.encode(out);
        self.signature.s.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.rlp_payload_length();
        payload_length
            + Header {
                list: true,
                payload_length,
            }
            .length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    fn example_request() -> TxRequest {
        TxRequest {
            nonce: 9,
            gas_price: U256::from(20_000_000_000u64),
            gas_limit: 21_000,
            to: Address::from([0x35u8; 20]),
            value: U256::from(1_000_000_000_000_000_000u64),
            data: Bytes::new(),
            chain_id: 1,
        }
    }

    #[test]
    fn test_known_transfer_encoding() {
        // The well-known chain-id-1 transfer vector: 1 ether to
        // 0x3535...35 at nonce 9, 20 gwei gas price, 21000 gas.
        let signed = SignedTx {
            request: example_request(),
            signature: Signature {
                v: 37,
                r: U256::from_str_radix(
                    "28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276",
                    16,
                )
                .unwrap(),
                s: U256::from_str_radix(
                    "67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83",
                    16,
                )
                .unwrap(),
            },
        };

        let expected = hex::decode(
            "f86c098504a817c800825208943535353535353535353535353535353535353535880d\
             e0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1\
             590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1\
             966a3b6d83",
        )
        .unwrap();
        assert_eq!(signed.to_bytes(), expected);
    }

    #[test]
    fn test_zero_scalars_encode_as_empty_strings() {
        // The canonical minimal-bytes rule: zero is the empty byte
        // string (0x80), never a zero byte.
        let signed = SignedTx {
            request: TxRequest {
                nonce: 0,
                gas_price: U256::ZERO,
                gas_limit: 0,
                to: Address::ZERO,
                value: U256::ZERO,
                data: Bytes::new(),
                chain_id: 1,
            },
            signature: Signature {
                v: 27,
                r: U256::ZERO,
                s: U256::ZERO,
            },
        };

        let mut expected = vec![0xdd];
        expected.extend_from_slice(&[0x80, 0x80, 0x80]); // nonce, gas price, gas limit
        expected.push(0x94); // 20-byte recipient
        expected.extend_from_slice(&[0x00; 20]);
        expected.extend_from_slice(&[0x80, 0x80]); // value, data
        expected.extend_from_slice(&[0x1b, 0x80, 0x80]); // v, r, s
        assert_eq!(signed.to_bytes(), expected);
    }

    #[test]
    fn test_length_matches_encoding() {
        let signed = SignedTx {
            request: example_request(),
            signature: Signature {
                v: 38,
                r: U256::from(7u64),
                s: U256::MAX,
            },
        };
        assert_eq!(signed.length(), signed.to_bytes().len());
    }
}
