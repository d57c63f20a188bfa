//! Transaction enrichment pipeline.
//!
//! Fills the unresolved fields of a [`TxDraft`] from the external ledger
//! service. The conditional logic is precomputed once, up front, as an
//! [`EnrichmentPlan`] of explicit booleans — the ordering and side
//! effects of the pipeline are auditable from the plan alone, and each
//! step is independently testable through a stub [`LedgerRpc`].
//!
//! The service connection is opened only when the plan requires it:
//! a draft with every field supplied and an empty payload never touches
//! the network.

use alloy_primitives::Address;
use devgate_core::error::ServiceError;

use crate::rpc::{CallParams, LedgerRpc};
use crate::tx::{TxDraft, TxRequest};

/// The enrichment steps a draft needs, evaluated once before any
/// network access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentPlan {
    /// Query the current network gas price (gas price absent).
    pub fetch_gas_price: bool,
    /// Estimate gas for the call (payload non-empty, or gas limit
    /// absent). When the payload is non-empty the estimate replaces an
    /// explicitly supplied gas limit; see [`enrich`].
    pub estimate_gas: bool,
    /// Query the account transaction count (nonce absent).
    pub fetch_nonce: bool,
}

impl EnrichmentPlan {
    /// Compute the plan for a draft.
    #[must_use]
    pub fn for_draft(draft: &TxDraft) -> Self {
        Self {
            fetch_gas_price: draft.gas_price.is_none(),
            estimate_gas: !draft.data.is_empty() || draft.gas_limit.is_none(),
            fetch_nonce: draft.nonce.is_none(),
        }
    }

    /// Whether any step needs the external ledger service.
    ///
    /// Equivalent to: gas price absent, gas limit absent, nonce absent,
    /// or payload non-empty.
    #[must_use]
    pub const fn requires_service(&self) -> bool {
        self.fetch_gas_price || self.estimate_gas || self.fetch_nonce
    }
}

/// Resolve a draft into a [`TxRequest`], querying the ledger service for
/// any field the plan marks absent.
///
/// `from` is the sender address derived from the device. `connect` is
/// invoked at most once, and only when the plan requires the service.
///
/// Note the gas-limit policy: whenever the payload is non-empty the gas
/// estimate overwrites the gas limit, even one the caller supplied
/// explicitly.
///
/// # Errors
///
/// Returns [`ServiceError`] if connecting or any RPC step fails; the
/// underlying message is surfaced verbatim.
pub fn enrich<C>(draft: TxDraft, from: Address, connect: C) -> Result<TxRequest, ServiceError>
where
    C: FnOnce() -> Result<Box<dyn LedgerRpc>, ServiceError>,
{
    let plan = EnrichmentPlan::for_draft(&draft);
    let TxDraft {
        nonce,
        gas_price,
        gas_limit,
        to,
        value,
        data,
        chain_id,
    } = draft;

    // Fast path: every field supplied and nothing to estimate.
    if let (false, Some(nonce), Some(gas_price), Some(gas_limit)) =
        (plan.requires_service(), nonce, gas_price, gas_limit)
    {
        return Ok(TxRequest {
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            data,
            chain_id,
        });
    }

    let rpc = connect()?;
    tracing::debug!(?plan, "enriching transaction from ledger service");

    let gas_price = match gas_price {
        Some(price) => price,
        None => rpc.gas_price()?,
    };
    let gas_limit = match gas_limit {
        Some(limit) if !plan.estimate_gas => limit,
        _ => rpc.estimate_gas(&CallParams {
            from,
            to,
            value,
            data: data.clone(),
        })?,
    };
    let nonce = match nonce {
        Some(nonce) => nonce,
        None => rpc.transaction_count(from)?,
    };

    Ok(TxRequest {
        nonce,
        gas_price,
        gas_limit,
        to,
        value,
        data,
        chain_id,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use alloy_primitives::{Bytes, U256};

    use super::*;

    /// Stub ledger service that records the calls it receives.
    ///
    /// The call log is shared so tests keep a handle after the stub
    /// moves into the connect closure.
    #[derive(Default, Clone)]
    struct StubRpc {
        calls: Rc<RefCell<Vec<&'static str>>>,
    }

    impl StubRpc {
        fn log(&self) -> Rc<RefCell<Vec<&'static str>>> {
            Rc::clone(&self.calls)
        }
    }

    impl LedgerRpc for StubRpc {
        fn gas_price(&self) -> Result<U256, ServiceError> {
            self.calls.borrow_mut().push("gas_price");
            Ok(U256::from(30_000_000_000u64))
        }

        fn estimate_gas(&self, _call: &CallParams) -> Result<u64, ServiceError> {
            self.calls.borrow_mut().push("estimate_gas");
            Ok(53_000)
        }

        fn transaction_count(&self, _address: Address) -> Result<u64, ServiceError> {
            self.calls.borrow_mut().push("transaction_count");
            Ok(42)
        }

        fn send_raw_transaction(&self, _raw: &[u8]) -> Result<String, ServiceError> {
            self.calls.borrow_mut().push("send_raw_transaction");
            Ok("0xtx".to_string())
        }
    }

    fn draft() -> TxDraft {
        TxDraft {
            nonce: Some(9),
            gas_price: Some(U256::from(20_000_000_000u64)),
            gas_limit: Some(21_000),
            to: Address::from([0x35u8; 20]),
            value: U256::from(1u64),
            data: Bytes::new(),
            chain_id: 1,
        }
    }

    fn sender() -> Address {
        Address::from([0x11u8; 20])
    }

    fn connect_stub(stub: StubRpc) -> impl FnOnce() -> Result<Box<dyn LedgerRpc>, ServiceError> {
        move || Ok(Box::new(stub) as Box<dyn LedgerRpc>)
    }

    #[test]
    fn test_fully_supplied_draft_never_connects() {
        let request = enrich(draft(), sender(), || {
            panic!("service connection must not be opened")
        })
        .unwrap();
        assert_eq!(request.nonce, 9);
        assert_eq!(request.gas_limit, 21_000);
    }

    #[test]
    fn test_missing_nonce_makes_exactly_one_call() {
        let mut d = draft();
        d.nonce = None;

        let stub = StubRpc::default();
        let calls = stub.log();
        let request = enrich(d, sender(), connect_stub(stub)).unwrap();

        assert_eq!(request.nonce, 42);
        // Gas price and limit pass through unchanged.
        assert_eq!(request.gas_price, U256::from(20_000_000_000u64));
        assert_eq!(request.gas_limit, 21_000);
        assert_eq!(*calls.borrow(), vec!["transaction_count"]);
    }

    #[test]
    fn test_payload_overwrites_supplied_gas_limit() {
        let mut d = draft();
        d.data = Bytes::from(vec![0xa9, 0x05, 0x9c, 0xbb]);

        let stub = StubRpc::default();
        let calls = stub.log();
        let request = enrich(d, sender(), connect_stub(stub)).unwrap();

        // The explicit 21000 was discarded in favor of the estimate.
        assert_eq!(request.gas_limit, 53_000);
        assert_eq!(*calls.borrow(), vec!["estimate_gas"]);
    }

    #[test]
    fn test_absent_gas_limit_is_estimated_without_payload() {
        let mut d = draft();
        d.gas_limit = None;

        let stub = StubRpc::default();
        let calls = stub.log();
        let request = enrich(d, sender(), connect_stub(stub)).unwrap();

        assert_eq!(request.gas_limit, 53_000);
        assert_eq!(*calls.borrow(), vec!["estimate_gas"]);
    }

    #[test]
    fn test_all_fields_absent_runs_every_step_in_order() {
        let mut d = draft();
        d.nonce = None;
        d.gas_price = None;
        d.gas_limit = None;

        let stub = StubRpc::default();
        let calls = stub.log();
        let request = enrich(d, sender(), connect_stub(stub)).unwrap();

        assert_eq!(request.gas_price, U256::from(30_000_000_000u64));
        assert_eq!(request.gas_limit, 53_000);
        assert_eq!(request.nonce, 42);
        assert_eq!(
            *calls.borrow(),
            vec!["gas_price", "estimate_gas", "transaction_count"]
        );
    }

    #[test]
    fn test_plan_predicates() {
        let plan = EnrichmentPlan::for_draft(&draft());
        assert!(!plan.requires_service());

        let mut d = draft();
        d.data = Bytes::from(vec![0x01]);
        let plan = EnrichmentPlan::for_draft(&d);
        assert!(plan.estimate_gas);
        assert!(plan.requires_service());

        let mut d = draft();
        d.gas_price = None;
        let plan = EnrichmentPlan::for_draft(&d);
        assert!(plan.fetch_gas_price);
        assert!(!plan.estimate_gas);
        assert!(plan.requires_service());
    }

    #[test]
    fn test_connect_failure_surfaces() {
        let mut d = draft();
        d.nonce = None;

        let err = enrich(d, sender(), || {
            Err(ServiceError::timeout("http://localhost:8545"))
        })
        .unwrap_err();
        assert!(matches!(err, ServiceError::Timeout { .. }));
    }
}
