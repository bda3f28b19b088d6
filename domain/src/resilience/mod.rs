//! Resilience primitives shared by the decorators.
//!
//! [`circuit`] holds the circuit-breaker state machine as plain data. The
//! decorator in the application layer owns the lock and the clock; this
//! module only decides transitions.

pub mod circuit;

pub use circuit::{Admission, CallOutcome, Circuit, CircuitBreakerConfig, CircuitState};
