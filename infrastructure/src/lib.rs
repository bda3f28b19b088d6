//! Infrastructure layer for tool-gateway
//!
//! This crate contains the concrete capability providers (in-process tools
//! and remote tool server bridges), configuration file loading and the
//! JSONL adapter for the invocation audit port.

pub mod bridge;
pub mod config;
pub mod logging;
pub mod tools;

// Re-export commonly used types
pub use bridge::{BridgeClient, BridgeError, BridgeToolProvider};
pub use config::{
    ConfigLoader, ConfigValidationError, FileBridgeConfig, FileConfig, FileProvidersConfig,
};
pub use logging::JsonlInvocationLogger;
pub use tools::{BUILTIN_PROVIDER_ID, LocalToolProvider, builtin_provider, builtin_tools};
