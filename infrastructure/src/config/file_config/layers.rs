//! Decorator layer sections: `[cache]`, `[circuit_breaker]`, `[metrics]`, `[logging]`

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// `[cache]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    pub enabled: bool,
    /// Lifetime of a cached outcome
    pub ttl_seconds: u64,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 300,
        }
    }
}

/// `[circuit_breaker]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCircuitBreakerConfig {
    pub enabled: bool,
    pub failure_threshold: u32,
    pub recovery_timeout_seconds: u64,
    pub success_threshold: u32,
}

impl Default for FileCircuitBreakerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_threshold: 5,
            recovery_timeout_seconds: 30,
            success_threshold: 3,
        }
    }
}

/// `[metrics]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMetricsConfig {
    pub enabled: bool,
    /// Log a summary every N executions (0 = never)
    pub summary_every: u64,
}

impl Default for FileMetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            summary_every: 10,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    pub enabled: bool,
    /// JSONL audit file, one line per execution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_log: Option<PathBuf>,
    pub input_preview_chars: usize,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            audit_log: None,
            input_preview_chars: 200,
        }
    }
}
