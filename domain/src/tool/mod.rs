//! Tool domain module
//!
//! This module defines the core abstractions of the gateway: what a tool is,
//! how it is invoked, and the single contract every backend exposes.
//!
//! # Overview
//!
//! Every tool is described by a [`ToolDescriptor`] (name + description) and
//! backed by a [`ToolHandler`]. Handlers are grouped behind a
//! [`CapabilityProvider`], which is the only surface callers ever see.
//!
//! ```text
//! ┌────────────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ CapabilityProvider │───▶│ Tool         │───▶│ ToolHandler  │
//! │ (list / execute)   │    │ (descriptor) │    │ (call_fn)    │
//! └────────────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! Input and output of an execution are opaque strings (conventionally JSON).
//! Nothing in the gateway interprets them except the caching decorator, which
//! fingerprints the input.
//!
//! # Key Types
//!
//! - [`ToolDescriptor`]: name and description published in a catalog
//! - [`Tool`]: descriptor plus callable implementation
//! - [`CapabilityProvider`]: list / execute / register / validate contract
//! - [`ProviderError`]: error taxonomy shared by every layer
//! - [`ToolError`]: failure raised by a tool implementation itself

pub mod entities;
pub mod provider;
pub mod requirements;
pub mod value_objects;

pub use entities::{FnHandler, Tool, ToolDescriptor, ToolHandler};
pub use provider::{CapabilityProvider, ProviderError};
pub use value_objects::ToolError;
