//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and translated into
//! [`ChainParams`] for the decorator chain.

mod layers;
mod providers;

pub use layers::{FileCacheConfig, FileCircuitBreakerConfig, FileLoggingConfig, FileMetricsConfig};
pub use providers::{FileBridgeConfig, FileBuiltinConfig, FileProvidersConfig};

use std::collections::HashSet;
use std::time::Duration;

use gateway_application::ChainParams;
use gateway_domain::CircuitBreakerConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("cache.ttl_seconds cannot be 0 while the cache is enabled")]
    ZeroCacheTtl,

    #[error("circuit_breaker.{field} cannot be 0")]
    ZeroThreshold { field: &'static str },

    #[error("providers.bridges[{index}]: name cannot be empty")]
    EmptyBridgeName { index: usize },

    #[error("providers.bridges[{index}] ({name}): command cannot be empty")]
    EmptyBridgeCommand { index: usize, name: String },

    #[error("providers.bridges: duplicate name '{0}'")]
    DuplicateBridgeName(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub cache: FileCacheConfig,
    pub circuit_breaker: FileCircuitBreakerConfig,
    pub metrics: FileMetricsConfig,
    pub logging: FileLoggingConfig,
    pub providers: FileProvidersConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning every detected issue.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if self.cache.enabled && self.cache.ttl_seconds == 0 {
            issues.push(ConfigValidationError::ZeroCacheTtl);
        }

        if self.circuit_breaker.enabled {
            if self.circuit_breaker.failure_threshold == 0 {
                issues.push(ConfigValidationError::ZeroThreshold {
                    field: "failure_threshold",
                });
            }
            if self.circuit_breaker.success_threshold == 0 {
                issues.push(ConfigValidationError::ZeroThreshold {
                    field: "success_threshold",
                });
            }
        }

        let mut seen = HashSet::new();
        for (index, bridge) in self.providers.bridges.iter().enumerate() {
            let name = bridge.name.trim();
            if name.is_empty() {
                issues.push(ConfigValidationError::EmptyBridgeName { index });
            } else if !seen.insert(name) {
                issues.push(ConfigValidationError::DuplicateBridgeName(name.to_string()));
            }
            if bridge.command.trim().is_empty() {
                issues.push(ConfigValidationError::EmptyBridgeCommand {
                    index,
                    name: bridge.name.clone(),
                });
            }
        }

        issues
    }

    /// Translate the layer sections into chain parameters
    pub fn to_chain_params(&self) -> ChainParams {
        let circuit_breaker = self.circuit_breaker.enabled.then(|| {
            CircuitBreakerConfig::new(
                self.circuit_breaker.failure_threshold,
                Duration::from_secs(self.circuit_breaker.recovery_timeout_seconds),
                self.circuit_breaker.success_threshold,
            )
        });

        ChainParams::default()
            .with_logging(self.logging.enabled)
            .with_input_preview_chars(self.logging.input_preview_chars)
            .with_metrics(self.metrics.enabled.then_some(self.metrics.summary_every))
            .with_circuit_breaker(circuit_breaker)
            .with_cache_ttl(
                self.cache
                    .enabled
                    .then(|| Duration::from_secs(self.cache.ttl_seconds)),
            )
    }
}
