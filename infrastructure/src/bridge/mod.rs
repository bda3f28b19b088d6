//! Remote tool bridge
//!
//! Proxies a [`CapabilityProvider`](gateway_domain::CapabilityProvider) to an
//! out-of-process tool server speaking JSON-RPC 2.0 over stdio, framed with
//! `Content-Length` headers.
//!
//! - [`protocol`]: request, response and payload types
//! - [`transport`]: frame reading/writing and message classification
//! - [`client`]: background reader plus request/response correlation
//! - [`provider`]: [`BridgeToolProvider`], spawning and error mapping

pub mod client;
pub mod error;
pub mod protocol;
pub mod provider;
pub mod transport;

pub use client::BridgeClient;
pub use error::BridgeError;
pub use provider::BridgeToolProvider;
