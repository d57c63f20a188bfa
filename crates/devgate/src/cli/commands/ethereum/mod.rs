//! Ethereum commands.
//!
//! - [`AddressCommand`] - Display the address derived on the device
//! - [`SignCommand`] - The transaction enrichment and signing pipeline

pub mod address;
pub mod sign;

pub use address::AddressCommand;
pub use sign::SignCommand;
