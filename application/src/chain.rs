//! Decorator chain assembly
//!
//! [`ChainBuilder`] wraps a base provider in decorator layers and keeps typed
//! handles to the stateful ones, so statistics stay reachable after the
//! chain is erased to `Arc<dyn CapabilityProvider>`.
//!
//! Layers are listed outermost first. The standard chain is:
//!
//! ```text
//! Logging ─▶ Metrics ─▶ CircuitBreaker ─▶ Caching ─▶ base
//! ```

use std::sync::Arc;
use std::time::Duration;

use gateway_domain::{CapabilityProvider, CircuitBreakerConfig};
use serde::Serialize;

use crate::config::ChainParams;
use crate::decorators::{
    CacheStats, CachingDecorator, CircuitBreakerDecorator, CircuitStats, LoggingDecorator,
    MetricsDecorator, MetricsSnapshot,
};
use crate::ports::invocation_logger::{InvocationLogger, NoInvocationLogger};

/// One decorator layer
#[derive(Clone)]
pub enum Layer {
    Logging {
        audit: Arc<dyn InvocationLogger>,
        preview_chars: usize,
    },
    Metrics {
        summary_every: u64,
    },
    CircuitBreaker(CircuitBreakerConfig),
    Caching {
        ttl: Duration,
    },
}

impl Layer {
    /// Logging without an audit sink
    pub fn logging() -> Self {
        Layer::Logging {
            audit: Arc::new(NoInvocationLogger),
            preview_chars: 200,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Layer::Logging { .. } => "logging",
            Layer::Metrics { .. } => "metrics",
            Layer::CircuitBreaker(_) => "circuit_breaker",
            Layer::Caching { .. } => "caching",
        }
    }
}

/// Statistics gathered from every stateful layer of one chain
#[derive(Debug, Clone, Serialize)]
pub struct ChainStats {
    pub provider: String,
    pub layers: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit: Option<CircuitStats>,
}

/// A provider wrapped in decorators, plus handles into the layers.
///
/// When a layer kind appears more than once, the handle points at the
/// outermost instance.
#[derive(Clone)]
pub struct DecoratedProvider {
    provider: Arc<dyn CapabilityProvider>,
    layers: Vec<&'static str>,
    metrics: Option<Arc<MetricsDecorator>>,
    cache: Option<Arc<CachingDecorator>>,
    breaker: Option<Arc<CircuitBreakerDecorator>>,
}

impl DecoratedProvider {
    /// The outermost layer
    pub fn provider(&self) -> Arc<dyn CapabilityProvider> {
        self.provider.clone()
    }

    pub fn id(&self) -> &str {
        self.provider.id()
    }

    /// Layer names, outermost first
    pub fn layers(&self) -> &[&'static str] {
        &self.layers
    }

    pub fn metrics(&self) -> Option<&Arc<MetricsDecorator>> {
        self.metrics.as_ref()
    }

    pub fn cache(&self) -> Option<&Arc<CachingDecorator>> {
        self.cache.as_ref()
    }

    pub fn circuit_breaker(&self) -> Option<&Arc<CircuitBreakerDecorator>> {
        self.breaker.as_ref()
    }

    pub async fn stats(&self) -> ChainStats {
        let metrics = match &self.metrics {
            Some(m) => Some(m.snapshot().await),
            None => None,
        };
        let cache = match &self.cache {
            Some(c) => Some(c.stats().await),
            None => None,
        };
        let circuit = match &self.breaker {
            Some(b) => Some(b.stats().await),
            None => None,
        };

        ChainStats {
            provider: self.id().to_string(),
            layers: self.layers.clone(),
            metrics,
            cache,
            circuit,
        }
    }
}

/// Builds a [`DecoratedProvider`] from a base provider
pub struct ChainBuilder {
    base: Arc<dyn CapabilityProvider>,
    layers: Vec<Layer>,
}

impl ChainBuilder {
    pub fn new(base: Arc<dyn CapabilityProvider>) -> Self {
        Self {
            base,
            layers: Vec::new(),
        }
    }

    /// Standard order from `params`, skipping disabled layers.
    pub fn standard(
        base: Arc<dyn CapabilityProvider>,
        params: &ChainParams,
        audit: Arc<dyn InvocationLogger>,
    ) -> Self {
        let mut builder = Self::new(base);
        if params.logging {
            builder = builder.layer(Layer::Logging {
                audit,
                preview_chars: params.input_preview_chars,
            });
        }
        if let Some(summary_every) = params.metrics_summary_every {
            builder = builder.layer(Layer::Metrics { summary_every });
        }
        if let Some(config) = &params.circuit_breaker {
            builder = builder.layer(Layer::CircuitBreaker(config.clone()));
        }
        if let Some(ttl) = params.cache_ttl {
            builder = builder.layer(Layer::Caching { ttl });
        }
        builder
    }

    /// Add a layer inside every layer added so far
    pub fn layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn build(self) -> DecoratedProvider {
        let mut provider = self.base;
        let mut metrics = None;
        let mut cache = None;
        let mut breaker = None;
        let names = self.layers.iter().map(Layer::name).collect();

        // Innermost layer wraps the base first
        for layer in self.layers.into_iter().rev() {
            let wrapped: Arc<dyn CapabilityProvider> = match layer {
                Layer::Logging {
                    audit,
                    preview_chars,
                } => Arc::new(
                    LoggingDecorator::new(provider)
                        .with_audit(audit)
                        .with_preview_chars(preview_chars),
                ),
                Layer::Metrics { summary_every } => {
                    let decorator =
                        Arc::new(MetricsDecorator::new(provider).with_summary_every(summary_every));
                    metrics = Some(decorator.clone());
                    decorator
                }
                Layer::CircuitBreaker(config) => {
                    let decorator = Arc::new(CircuitBreakerDecorator::with_config(provider, config));
                    breaker = Some(decorator.clone());
                    decorator
                }
                Layer::Caching { ttl } => {
                    let decorator = Arc::new(CachingDecorator::with_ttl(provider, ttl));
                    cache = Some(decorator.clone());
                    decorator
                }
            };
            provider = wrapped;
        }

        DecoratedProvider {
            provider,
            layers: names,
            metrics,
            cache,
            breaker,
        }
    }
}
