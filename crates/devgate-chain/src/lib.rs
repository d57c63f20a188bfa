//! # devgate-chain
//!
//! Ethereum transaction construction for the DevGate CLI: denomination
//! parsing, hex normalization, the draft/request transaction model with
//! canonical RLP encoding, the external ledger JSON-RPC client, and the
//! enrichment pipeline that resolves drafts against it.
//!
//! This crate is an internal implementation detail of the `devgate`
//! binary; its API is unstable.
//!
//! ## Modules
//!
//! - [`units`] - Denomination table and amount parsing
//! - [`hex`] - Strict hex normalization for addresses and calldata
//! - [`tx`] - Draft/request/signed transaction model and RLP encoding
//! - [`rpc`] - Ledger service JSON-RPC boundary
//! - [`enrich`] - Precomputed enrichment plan and execution

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod enrich;
pub mod hex;
pub mod rpc;
pub mod tx;
pub mod units;

pub use enrich::{enrich, EnrichmentPlan};
pub use rpc::{CallParams, JsonRpcClient, LedgerRpc, DEFAULT_NODE};
pub use tx::{Signature, SignedTx, TxDraft, TxRequest};
pub use units::{parse_amount, UnitTable};
