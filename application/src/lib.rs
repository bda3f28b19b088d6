//! Application layer for tool-gateway
//!
//! This crate contains the decorators, the aggregator, the decorator-chain
//! builder, the gateway use case and the port definitions.
//! It depends only on the domain layer.

pub mod aggregator;
pub mod chain;
pub mod config;
pub mod decorators;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use aggregator::{AggregatorStats, ToolAggregator, ToolConflict};
pub use chain::{ChainBuilder, ChainStats, DecoratedProvider, Layer};
pub use config::ChainParams;
pub use decorators::{
    CacheStats, CachingDecorator, CircuitBreakerDecorator, CircuitStats, LoggingDecorator,
    MetricsDecorator, MetricsSnapshot,
};
pub use ports::invocation_logger::{InvocationLogger, InvocationRecord, NoInvocationLogger};
pub use use_cases::tool_gateway::{
    Catalog, GatewayStats, InvocationAttempt, InvokeToolInput, InvokeToolOutput, ToolGateway,
};
