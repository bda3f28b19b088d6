//! Tool gateway use case.
//!
//! [`ToolGateway`] is the application entry point: it owns the aggregator
//! and the decorated chain of every member provider, and exposes the four
//! operations a caller needs (catalog, validate, invoke, statistics).

use std::sync::Arc;
use std::time::{Duration, Instant};

use gateway_domain::{CancellationToken, CapabilityProvider, ProviderError, Tool, ToolDescriptor};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::aggregator::{AggregatorStats, ToolAggregator, ToolConflict};
use crate::chain::{ChainStats, DecoratedProvider};

/// Input for [`ToolGateway::invoke`].
#[derive(Debug, Clone)]
pub struct InvokeToolInput {
    pub tool: String,
    /// Opaque payload, conventionally JSON
    pub input: String,
    /// Number of times to run the call, at least one
    pub repeat: usize,
}

impl InvokeToolInput {
    pub fn new(tool: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            input: input.into(),
            repeat: 1,
        }
    }

    pub fn with_repeat(mut self, repeat: usize) -> Self {
        self.repeat = repeat.max(1);
        self
    }
}

/// Outcome of one attempt
#[derive(Debug, Clone)]
pub struct InvocationAttempt {
    pub result: Result<String, ProviderError>,
    pub duration: Duration,
}

/// Output of [`ToolGateway::invoke`]
#[derive(Debug, Clone)]
pub struct InvokeToolOutput {
    pub tool: String,
    pub attempts: Vec<InvocationAttempt>,
}

impl InvokeToolOutput {
    /// Result of the final attempt
    pub fn last(&self) -> Option<&Result<String, ProviderError>> {
        self.attempts.last().map(|a| &a.result)
    }

    pub fn succeeded(&self) -> usize {
        self.attempts.iter().filter(|a| a.result.is_ok()).count()
    }
}

/// Aggregate catalog with the names hidden by conflicts
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub tools: Vec<ToolDescriptor>,
    pub conflicts: Vec<ToolConflict>,
}

/// Statistics for the whole gateway
#[derive(Debug, Clone, Serialize)]
pub struct GatewayStats {
    pub aggregator: AggregatorStats,
    pub providers: Vec<ChainStats>,
}

pub struct ToolGateway {
    aggregator: Arc<ToolAggregator>,
    chains: RwLock<Vec<DecoratedProvider>>,
}

impl ToolGateway {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            aggregator: Arc::new(ToolAggregator::new(id)),
            chains: RwLock::new(Vec::new()),
        }
    }

    /// Add a decorated provider. Earlier providers win name conflicts.
    ///
    /// A provider whose id is already taken is refused and its chain dropped.
    pub async fn add_provider(&self, chain: DecoratedProvider) -> Result<(), ProviderError> {
        self.aggregator.add_provider(chain.provider()).await?;
        info!(provider = chain.id(), layers = ?chain.layers(), "Added provider to gateway");
        self.chains.write().await.push(chain);
        Ok(())
    }

    pub async fn remove_provider(&self, provider_id: &str) -> bool {
        self.chains.write().await.retain(|c| c.id() != provider_id);
        self.aggregator.remove_provider(provider_id).await
    }

    /// The aggregate as a plain provider
    pub fn provider(&self) -> Arc<dyn CapabilityProvider> {
        self.aggregator.clone()
    }

    pub async fn catalog(&self) -> Catalog {
        Catalog {
            tools: self.aggregator.list_tools().await,
            conflicts: self.aggregator.conflicts().await,
        }
    }

    /// Check every required tool before an agent starts
    pub async fn validate(&self, required: &[String]) -> Result<Vec<ToolDescriptor>, ProviderError> {
        self.aggregator.list_tools_for(required).await
    }

    pub async fn register(&self, tool: Tool) -> Result<(), ProviderError> {
        self.aggregator.register(tool).await
    }

    /// Run a tool `input.repeat` times, stopping early on cancellation.
    pub async fn invoke(
        &self,
        input: InvokeToolInput,
        cancellation: &CancellationToken,
    ) -> InvokeToolOutput {
        let mut attempts = Vec::with_capacity(input.repeat);

        for attempt in 1..=input.repeat {
            let started = Instant::now();
            let result = self
                .aggregator
                .execute(&input.tool, &input.input, cancellation)
                .await;
            let duration = started.elapsed();
            debug!(
                tool = %input.tool,
                attempt,
                ok = result.is_ok(),
                duration_ms = duration.as_millis() as u64,
                "Invocation finished"
            );

            let cancelled = matches!(&result, Err(e) if e.is_cancelled());
            attempts.push(InvocationAttempt { result, duration });
            if cancelled {
                break;
            }
        }

        InvokeToolOutput {
            tool: input.tool,
            attempts,
        }
    }

    pub async fn stats(&self) -> GatewayStats {
        let chains = self.chains.read().await.clone();
        let mut providers = Vec::with_capacity(chains.len());
        for chain in &chains {
            providers.push(chain.stats().await);
        }

        GatewayStats {
            aggregator: self.aggregator.stats().await,
            providers,
        }
    }
}
