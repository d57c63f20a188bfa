//! The `devgate ethereum sign` command.
//!
//! The transaction enrichment pipeline, end to end:
//!
//! 1. Parse amounts against the unit table and normalize hex — local
//!    validation, before any network access.
//! 2. Derive the sender address from the device.
//! 3. Resolve the draft through the enrichment plan, opening the
//!    external node connection only when a field needs it.
//! 4. Sign on the device and RLP-encode the result.
//! 5. Publish through the node, or print the raw bytes.

use alloy_primitives::Bytes;
use devgate_chain::enrich::enrich;
use devgate_chain::hex as chain_hex;
use devgate_chain::rpc::{JsonRpcClient, LedgerRpc};
use devgate_chain::tx::{SignedTx, TxDraft};
use devgate_chain::units::{parse_amount, UnitTable};
use devgate_core::error::{DevgateError, ServiceError};
use devgate_core::report::Report;
use devgate_device::path::parse_path;
use devgate_device::DeviceClient;

use crate::cli::args::EthereumSignArgs;

/// Build, enrich, sign, and optionally publish a transaction.
#[derive(Debug, Clone)]
pub struct SignCommand {
    args: EthereumSignArgs,
    node: String,
    units: UnitTable,
}

impl SignCommand {
    /// Create the command.
    ///
    /// `node` is the resolved external node address; `units` is the
    /// injected denomination table.
    #[must_use]
    pub fn new(args: EthereumSignArgs, node: String, units: UnitTable) -> Self {
        Self { args, node, units }
    }

    /// Run against an open session, connecting to the node on demand.
    ///
    /// # Errors
    ///
    /// Validation errors reject before any external call; service and
    /// device failures propagate, a device refusal carrying its status
    /// code into the exit status.
    pub fn run(&self, device: &mut dyn DeviceClient) -> Result<Report, DevgateError> {
        self.run_with(device, |node| {
            JsonRpcClient::connect(node).map(|client| Box::new(client) as Box<dyn LedgerRpc>)
        })
    }

    /// Run with an explicit node connector (the seam tests use).
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn run_with<C>(
        &self,
        device: &mut dyn DeviceClient,
        connect: C,
    ) -> Result<Report, DevgateError>
    where
        C: Fn(&str) -> Result<Box<dyn LedgerRpc>, ServiceError>,
    {
        // Local validation first; an unrecognized unit or malformed hex
        // rejects before the node or device is touched.
        let value = parse_amount(&self.args.value, &self.units)?;
        let gas_price = self
            .args
            .gas_price
            .as_deref()
            .map(|amount| parse_amount(amount, &self.units))
            .transpose()?;
        let to = chain_hex::decode_address(&self.args.to, "to")?;
        let data = Bytes::from(chain_hex::decode(&self.args.data, "data")?);
        let path = parse_path(&self.args.derivation)?;

        let from = device.derive_address(&path)?;

        let draft = TxDraft {
            nonce: self.args.nonce,
            gas_price,
            gas_limit: self.args.gas_limit,
            to,
            value,
            data,
            chain_id: self.args.chain_id,
        };
        let request = enrich(draft, from, || connect(&self.node))?;

        let signature = device.sign_transaction(&path, &request)?;
        let raw = SignedTx { request, signature }.to_bytes();

        if self.args.publish {
            let rpc = connect(&self.node)?;
            let txid = rpc.send_raw_transaction(&raw)?;
            Ok(Report::text(format!("Transaction published with ID: {txid}")))
        } else {
            Ok(Report::text(format!(
                "Signed raw transaction: 0x{}",
                hex::encode(raw)
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, U256};
    use devgate_core::error::ValidationError;

    use super::*;
    use crate::cli::commands::test_support::{vector_signature, StubDevice, StubRpc};

    /// The well-known transfer: 1 ether to 0x3535...35, nonce 9,
    /// 20 gwei gas price, 21000 gas, chain id 1.
    const VECTOR_RAW: &str =
        "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a7\
         6400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a0\
         67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83";

    fn sign_args() -> EthereumSignArgs {
        EthereumSignArgs {
            derivation: "m/44'/60'/0'/0/0".to_string(),
            to: "0x3535353535353535353535353535353535353535".to_string(),
            value: "1 ether".to_string(),
            gas_price: Some("20 gwei".to_string()),
            gas_limit: Some(21_000),
            nonce: Some(9),
            data: String::new(),
            chain_id: 1,
            node: None,
            publish: false,
        }
    }

    fn command(args: EthereumSignArgs) -> SignCommand {
        SignCommand::new(args, "localhost:8545".to_string(), UnitTable::ethereum())
    }

    #[test]
    fn test_fully_specified_sign_makes_no_service_call() {
        let mut device = StubDevice {
            signature: vector_signature(),
            ..StubDevice::default()
        };

        let report = command(sign_args())
            .run_with(&mut device, |_| {
                panic!("no external service call may occur")
            })
            .unwrap();

        assert_eq!(
            report.render_text(),
            format!("Signed raw transaction: 0x{VECTOR_RAW}")
        );
        assert_eq!(device.calls, vec!["derive_address", "sign_transaction"]);
    }

    #[test]
    fn test_omitted_nonce_fetches_transaction_count_only() {
        let mut device = StubDevice {
            signature: vector_signature(),
            ..StubDevice::default()
        };
        let mut args = sign_args();
        args.nonce = None;

        let rpc = StubRpc::default();
        let calls = rpc.log();
        command(args)
            .run_with(&mut device, move |_| Ok(Box::new(rpc.clone()) as Box<dyn LedgerRpc>))
            .unwrap();

        assert_eq!(*calls.borrow(), vec!["transaction_count"]);
        // Gas price and limit passed through unchanged.
        let signed = device.signed_request.expect("device signed");
        assert_eq!(signed.gas_price, U256::from(20_000_000_000u64));
        assert_eq!(signed.gas_limit, 21_000);
        assert_eq!(signed.nonce, StubRpc::NONCE);
    }

    #[test]
    fn test_publish_submits_raw_bytes() {
        let mut device = StubDevice {
            signature: vector_signature(),
            ..StubDevice::default()
        };
        let mut args = sign_args();
        args.publish = true;

        let rpc = StubRpc::default();
        let calls = rpc.log();
        let report = command(args)
            .run_with(&mut device, move |_| Ok(Box::new(rpc.clone()) as Box<dyn LedgerRpc>))
            .unwrap();

        assert_eq!(*calls.borrow(), vec!["send_raw_transaction"]);
        assert_eq!(
            report.render_text(),
            format!("Transaction published with ID: {}", StubRpc::TXID)
        );
    }

    #[test]
    fn test_unknown_unit_rejects_before_any_access() {
        let mut device = StubDevice::default();
        let mut args = sign_args();
        args.value = "1 parsec".to_string();

        let err = command(args)
            .run_with(&mut device, |_| panic!("no service access on reject"))
            .unwrap_err();

        assert!(matches!(
            err,
            DevgateError::Validation(ValidationError::UnrecognizedUnit { .. })
        ));
        assert!(device.calls.is_empty());
    }

    #[test]
    fn test_malformed_hex_rejects_before_any_access() {
        let mut device = StubDevice::default();
        let mut args = sign_args();
        args.data = "0xabc".to_string(); // odd length

        let err = command(args)
            .run_with(&mut device, |_| panic!("no service access on reject"))
            .unwrap_err();

        assert!(matches!(
            err,
            DevgateError::Validation(ValidationError::InvalidHex { .. })
        ));
        assert!(device.calls.is_empty());
    }

    #[test]
    fn test_sender_comes_from_device_not_caller() {
        let mut device = StubDevice {
            address: Address::from([0xabu8; 20]),
            signature: vector_signature(),
            ..StubDevice::default()
        };
        let mut args = sign_args();
        args.data = "0xa9059cbb".to_string();
        args.gas_limit = Some(21_000);

        let rpc = StubRpc::default();
        let estimate_from = rpc.estimate_from();
        command(args)
            .run_with(&mut device, move |_| Ok(Box::new(rpc.clone()) as Box<dyn LedgerRpc>))
            .unwrap();

        // The estimate call saw the derived address as sender, and the
        // supplied gas limit was overwritten by the estimate.
        assert_eq!(*estimate_from.borrow(), Some(Address::from([0xabu8; 20])));
        let signed = device.signed_request.expect("device signed");
        assert_eq!(signed.gas_limit, StubRpc::GAS_ESTIMATE);
    }
}
