//! Ledger service JSON-RPC client.
//!
//! The enrichment pipeline talks to an external Ethereum node over its
//! HTTP JSON-RPC boundary at a caller-specified `host:port`. The
//! [`LedgerRpc`] trait is the seam: production uses [`JsonRpcClient`],
//! tests substitute a recording stub.
//!
//! Calls are synchronous and carry one overall per-request timeout. There
//! are no retries; failures surface verbatim as
//! [`ServiceError`](devgate_core::error::ServiceError).

use std::time::Duration;

use alloy_primitives::{hex, Address, Bytes, U256};
use devgate_core::error::ServiceError;
use serde::Deserialize;
use serde_json::{json, Value};

/// Default ledger service address.
pub const DEFAULT_NODE: &str = "localhost:8545";

/// Overall timeout applied to each RPC request.
const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Parameters for a gas-estimation call.
#[derive(Debug, Clone)]
pub struct CallParams {
    /// Sender address (derived from the device, never caller-supplied).
    pub from: Address,
    /// Recipient address.
    pub to: Address,
    /// Transferred value in wei.
    pub value: U256,
    /// Call payload.
    pub data: Bytes,
}

/// The ledger service operations the enrichment pipeline needs.
pub trait LedgerRpc {
    /// Current network gas price in wei.
    fn gas_price(&self) -> Result<U256, ServiceError>;

    /// Estimated gas for a call with the given parameters.
    fn estimate_gas(&self, call: &CallParams) -> Result<u64, ServiceError>;

    /// Transaction count (next nonce) for an account.
    fn transaction_count(&self, address: Address) -> Result<u64, ServiceError>;

    /// Submit raw transaction bytes; returns the transaction id.
    fn send_raw_transaction(&self, raw: &[u8]) -> Result<String, ServiceError>;
}

/// Blocking JSON-RPC 2.0 client over HTTP.
#[derive(Debug)]
pub struct JsonRpcClient {
    client: reqwest::blocking::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl JsonRpcClient {
    /// Connect to a ledger service given as `host:port` (or a full URL).
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the HTTP client cannot be built.
    pub fn connect(node: &str) -> Result<Self, ServiceError> {
        let url = if node.starts_with("http://") || node.starts_with("https://") {
            node.to_string()
        } else {
            format!("http://{node}")
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(RPC_TIMEOUT)
            .build()
            .map_err(|e| ServiceError::http(&url, e.to_string()))?;
        Ok(Self { client, url })
    }

    /// The resolved endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn call(&self, method: &str, params: Value) -> Result<Value, ServiceError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        tracing::debug!(method, url = %self.url, "ledger service call");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::timeout(&self.url)
                } else {
                    ServiceError::http(&self.url, e.to_string())
                }
            })?;

        let parsed: RpcResponse = response.json().map_err(|e| {
            ServiceError::malformed_response(format!("{method}: {e}"))
        })?;

        if let Some(error) = parsed.error {
            return Err(ServiceError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        parsed
            .result
            .ok_or_else(|| ServiceError::malformed_response(format!("{method}: missing result")))
    }
}

impl LedgerRpc for JsonRpcClient {
    fn gas_price(&self) -> Result<U256, ServiceError> {
        let result = self.call("eth_gasPrice", json!([]))?;
        parse_quantity(&result, "eth_gasPrice")
    }

    fn estimate_gas(&self, call: &CallParams) -> Result<u64, ServiceError> {
        let result = self.call(
            "eth_estimateGas",
            json!([{
                "from": hex_address(call.from),
                "to": hex_address(call.to),
                "value": hex_quantity(call.value),
                "data": format!("0x{}", hex::encode(&call.data)),
            }]),
        )?;
        parse_quantity_u64(&result, "eth_estimateGas")
    }

    fn transaction_count(&self, address: Address) -> Result<u64, ServiceError> {
        let result = self.call(
            "eth_getTransactionCount",
            json!([hex_address(address), "pending"]),
        )?;
        parse_quantity_u64(&result, "eth_getTransactionCount")
    }

    fn send_raw_transaction(&self, raw: &[u8]) -> Result<String, ServiceError> {
        let result = self.call(
            "eth_sendRawTransaction",
            json!([format!("0x{}", hex::encode(raw))]),
        )?;
        result
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| {
                ServiceError::malformed_response("eth_sendRawTransaction: result is not a string")
            })
    }
}

fn hex_address(address: Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

fn hex_quantity(value: U256) -> String {
    format!("{value:#x}")
}

/// Parse a JSON-RPC quantity (`"0x…"` hex string) into a U256.
fn parse_quantity(value: &Value, context: &str) -> Result<U256, ServiceError> {
    let text = value.as_str().ok_or_else(|| {
        ServiceError::malformed_response(format!("{context}: quantity is not a string"))
    })?;
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    U256::from_str_radix(digits, 16)
        .map_err(|e| ServiceError::malformed_response(format!("{context}: {e}")))
}

fn parse_quantity_u64(value: &Value, context: &str) -> Result<u64, ServiceError> {
    let quantity = parse_quantity(value, context)?;
    u64::try_from(quantity).map_err(|_| {
        ServiceError::malformed_response(format!("{context}: quantity exceeds 64 bits"))
    })
}
