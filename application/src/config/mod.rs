//! Application-level configuration.
//!
//! - [`ChainParams`]: which decorators wrap each provider and how they are tuned

pub mod chain_params;

pub use chain_params::ChainParams;
