//! # DevGate
//!
//! Operator CLI for the DevGate hardware signing device.
//!
//! The binary turns command invocations into device-protocol calls,
//! enriches transaction fields from external services where needed, and
//! renders results as text or JSON.
//!
//! ## Usage
//!
//! ```bash
//! # List connected devices
//! devgate list-devices
//!
//! # Show the device feature report
//! devgate features
//!
//! # Display an address
//! devgate ethereum address -n "m/44'/60'/0'/0/0"
//!
//! # Sign a transfer, fetching gas price and nonce from a node
//! devgate ethereum sign 0x3535...35 "1 ether" --node localhost:8545
//!
//! # Install the latest firmware release
//! devgate firmware-update
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cli;
pub mod logging;
