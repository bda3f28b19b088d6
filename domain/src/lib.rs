//! Domain layer for tool-gateway
//!
//! This crate contains the contracts every layer of the gateway speaks:
//! tool descriptors, the [`CapabilityProvider`] trait, the error taxonomy,
//! requirement validation and the circuit-breaker state machine.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Capability Provider
//!
//! A backend that can list its tools, execute one by name and report whether
//! a name exists. Local registries, remote bridges, decorators and the
//! aggregator all implement the same trait, so they compose freely.
//!
//! ## Circuit
//!
//! The breaker's three-state machine is modelled as plain data plus pure
//! transition functions in [`resilience::circuit`], independent of locking.

pub mod resilience;
pub mod tool;
pub mod util;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use resilience::circuit::{
    Admission, CallOutcome, Circuit, CircuitBreakerConfig, CircuitState,
};
pub use tool::{
    entities::{FnHandler, Tool, ToolDescriptor, ToolHandler},
    provider::{CapabilityProvider, ProviderError},
    requirements::{check_requirements, missing_requirements, select_required},
    value_objects::ToolError,
};

/// Cancellation handle threaded through every provider call.
pub use tokio_util::sync::CancellationToken;
