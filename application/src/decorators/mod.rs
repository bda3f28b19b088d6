//! Cross-cutting decorators
//!
//! Each decorator wraps exactly one inner [`CapabilityProvider`] and is itself
//! a [`CapabilityProvider`], so they stack in any order:
//!
//! ```text
//! Logging ─▶ Metrics ─▶ CircuitBreaker ─▶ Caching ─▶ base provider
//! ```
//!
//! That is the standard order (outermost first) produced by
//! [`ChainBuilder::standard`](crate::chain::ChainBuilder::standard).
//! Every decorator forwards the caller's cancellation token unchanged and
//! none of them retries.
//!
//! [`CapabilityProvider`]: gateway_domain::CapabilityProvider

pub mod caching;
pub mod circuit_breaker;
pub mod logging;
pub mod metrics;

pub use caching::{CacheStats, CachingDecorator, fingerprint};
pub use circuit_breaker::{CircuitBreakerDecorator, CircuitStats};
pub use logging::LoggingDecorator;
pub use metrics::{MetricsDecorator, MetricsSnapshot};
