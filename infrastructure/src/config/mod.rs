//! Configuration file loading for tool-gateway
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `TOOL_GATEWAY_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./gateway.toml` or `./.gateway.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/tool-gateway/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileBridgeConfig, FileBuiltinConfig, FileCacheConfig,
    FileCircuitBreakerConfig, FileConfig, FileLoggingConfig, FileMetricsConfig,
    FileProvidersConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
