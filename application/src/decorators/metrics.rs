//! Metrics decorator
//!
//! Records per-tool execution counts, duration history and error counts.
//! Every `summary_every`-th execution a summary line is logged.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use gateway_domain::{CancellationToken, CapabilityProvider, ProviderError, Tool, ToolDescriptor};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

const DEFAULT_SUMMARY_EVERY: u64 = 10;

/// Point-in-time copy of the collected metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub execution_counts: HashMap<String, u64>,
    /// Duration of every execution, in completion order
    pub execution_times: HashMap<String, Vec<Duration>>,
    pub error_counts: HashMap<String, u64>,
    pub total_executions: u64,
    pub total_errors: u64,
}

impl MetricsSnapshot {
    /// Mean duration for one tool
    pub fn average_time(&self, tool: &str) -> Option<Duration> {
        let times = self.execution_times.get(tool)?;
        if times.is_empty() {
            return None;
        }
        Some(times.iter().sum::<Duration>() / times.len() as u32)
    }

    /// Fraction of executions that failed, 0.0 when nothing ran
    pub fn error_rate(&self) -> f64 {
        if self.total_executions == 0 {
            0.0
        } else {
            self.total_errors as f64 / self.total_executions as f64
        }
    }
}

pub struct MetricsDecorator {
    inner: Arc<dyn CapabilityProvider>,
    metrics: RwLock<MetricsSnapshot>,
    summary_every: u64,
}

impl MetricsDecorator {
    pub fn new(inner: Arc<dyn CapabilityProvider>) -> Self {
        Self {
            inner,
            metrics: RwLock::new(MetricsSnapshot::default()),
            summary_every: DEFAULT_SUMMARY_EVERY,
        }
    }

    /// Log a summary every `n` executions (0 disables the summary)
    pub fn with_summary_every(mut self, n: u64) -> Self {
        self.summary_every = n;
        self
    }

    /// Deep copy of the current metrics
    pub async fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.read().await.clone()
    }

    async fn record(&self, tool: &str, elapsed: Duration, failed: bool) {
        let summary = {
            let mut metrics = self.metrics.write().await;
            *metrics
                .execution_counts
                .entry(tool.to_string())
                .or_insert(0) += 1;
            metrics
                .execution_times
                .entry(tool.to_string())
                .or_default()
                .push(elapsed);
            metrics.total_executions += 1;
            if failed {
                *metrics.error_counts.entry(tool.to_string()).or_insert(0) += 1;
                metrics.total_errors += 1;
            }

            (self.summary_every > 0 && metrics.total_executions % self.summary_every == 0)
                .then(|| metrics.clone())
        };

        if let Some(snapshot) = summary {
            self.log_summary(&snapshot);
        }
    }

    fn log_summary(&self, snapshot: &MetricsSnapshot) {
        info!(
            provider = self.id(),
            total_executions = snapshot.total_executions,
            total_errors = snapshot.total_errors,
            error_rate = %format!("{:.1}%", snapshot.error_rate() * 100.0),
            "Tool metrics summary"
        );

        let mut tools: Vec<_> = snapshot.execution_counts.iter().collect();
        tools.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (tool, count) in tools {
            let avg_ms = snapshot
                .average_time(tool)
                .map(|d| d.as_secs_f64() * 1000.0)
                .unwrap_or(0.0);
            info!(
                provider = self.id(),
                tool = %tool,
                executions = count,
                errors = snapshot.error_counts.get(tool).copied().unwrap_or(0),
                avg_ms = %format!("{:.2}", avg_ms),
                "Tool metrics"
            );
        }
    }
}

#[async_trait]
impl CapabilityProvider for MetricsDecorator {
    fn id(&self) -> &str {
        self.inner.id()
    }

    async fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.inner.list_tools().await
    }

    async fn try_list_tools(&self) -> Result<Vec<ToolDescriptor>, ProviderError> {
        self.inner.try_list_tools().await
    }

    async fn list_tools_for(
        &self,
        required_names: &[String],
    ) -> Result<Vec<ToolDescriptor>, ProviderError> {
        self.inner.list_tools_for(required_names).await
    }

    async fn execute(
        &self,
        name: &str,
        input: &str,
        cancellation: &CancellationToken,
    ) -> Result<String, ProviderError> {
        let started = Instant::now();
        let result = self.inner.execute(name, input, cancellation).await;
        self.record(name, started.elapsed(), result.is_err()).await;
        result
    }

    async fn has(&self, name: &str) -> bool {
        self.inner.has(name).await
    }

    async fn register(&self, tool: Tool) -> Result<(), ProviderError> {
        self.inner.register(tool).await
    }

    async fn validate_requirements(&self, required_names: &[String]) -> Result<(), ProviderError> {
        self.inner.validate_requirements(required_names).await
    }

    async fn list_names(&self) -> Vec<String> {
        self.inner.list_names().await
    }
}
