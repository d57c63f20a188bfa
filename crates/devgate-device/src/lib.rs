//! # devgate-device
//!
//! The device boundary of the DevGate CLI: transport resolution, the
//! frame codec, and the typed protocol client.
//!
//! The wire protocol itself is treated as an opaque fallible RPC
//! boundary — [`DeviceClient`] is the seam commands program against,
//! and tests substitute stub clients without touching a transport.
//!
//! This crate is an internal implementation detail of the `devgate`
//! binary; its API is unstable.
//!
//! ## Modules
//!
//! - [`transport`] - Transport kinds, discovery, and resolution
//! - [`channel`] - Concrete Device Channel implementations
//! - [`wire`] - Frame codec
//! - [`client`] - `DeviceClient` trait and the production wire client
//! - [`path`] - Derivation path parsing

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod channel;
pub mod client;
pub mod path;
pub mod transport;
pub mod wire;

pub use channel::DeviceChannel;
pub use client::{DeviceClient, Features, MessageSignature, SettingsRequest, WireClient};
pub use transport::{enumerate, resolve, DeviceInfo, TransportKind};
