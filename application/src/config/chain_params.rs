//! Chain parameters: decorator selection and tuning.
//!
//! [`ChainParams`] is what the infrastructure config file is translated into
//! before [`ChainBuilder::standard`](crate::chain::ChainBuilder::standard)
//! wraps a base provider. A disabled layer is `None`.

use std::time::Duration;

use gateway_domain::CircuitBreakerConfig;

/// Decorator chain parameters.
///
/// | Layer | Field | Default |
/// |-------|-------|---------|
/// | Logging | `logging` | on, 200 char input preview |
/// | Metrics | `metrics_summary_every` | summary every 10 executions |
/// | Circuit breaker | `circuit_breaker` | 5 failures / 30s / 3 successes |
/// | Caching | `cache_ttl` | 5 minutes |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParams {
    /// Emit tracing records around every operation
    pub logging: bool,
    /// Bytes of input kept in log records
    pub input_preview_chars: usize,
    /// Log a metrics summary every N executions
    pub metrics_summary_every: Option<u64>,
    pub circuit_breaker: Option<CircuitBreakerConfig>,
    /// Lifetime of a cached outcome
    pub cache_ttl: Option<Duration>,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            logging: true,
            input_preview_chars: 200,
            metrics_summary_every: Some(10),
            circuit_breaker: Some(CircuitBreakerConfig::default()),
            cache_ttl: Some(Duration::from_secs(300)),
        }
    }
}

impl ChainParams {
    /// No decorators at all
    pub fn bare() -> Self {
        Self {
            logging: false,
            input_preview_chars: 200,
            metrics_summary_every: None,
            circuit_breaker: None,
            cache_ttl: None,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    pub fn with_input_preview_chars(mut self, chars: usize) -> Self {
        self.input_preview_chars = chars;
        self
    }

    pub fn with_metrics(mut self, summary_every: Option<u64>) -> Self {
        self.metrics_summary_every = summary_every;
        self
    }

    pub fn with_circuit_breaker(mut self, config: Option<CircuitBreakerConfig>) -> Self {
        self.circuit_breaker = config;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_every_layer() {
        let params = ChainParams::default();
        assert!(params.logging);
        assert_eq!(params.metrics_summary_every, Some(10));
        assert_eq!(params.cache_ttl, Some(Duration::from_secs(300)));
        assert_eq!(
            params.circuit_breaker.map(|c| c.failure_threshold),
            Some(5)
        );
    }

    #[test]
    fn test_builder_disables_layers() {
        let params = ChainParams::default()
            .with_cache_ttl(None)
            .with_circuit_breaker(None);
        assert!(params.cache_ttl.is_none());
        assert!(params.circuit_breaker.is_none());
        assert!(params.logging);
    }
}
