//! Circuit-breaker decorator
//!
//! Gates `execute` on the [`Circuit`] state machine. Catalog operations are
//! never gated. Admission and outcome recording are two separate critical
//! sections on the same mutex, so several callers may slip through while an
//! open circuit turns half-open; they all count toward the trial outcome.
//!
//! Caller cancellation is neither a success nor a failure of the backend and
//! leaves the circuit untouched.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use gateway_domain::{
    Admission, CallOutcome, CancellationToken, CapabilityProvider, Circuit, CircuitBreakerConfig,
    CircuitState, ProviderError, Tool, ToolDescriptor,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Observable breaker state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitStats {
    pub state: CircuitState,
    pub failure_count: u32,
    pub success_count: u32,
    /// Time since the last recorded failure
    pub since_last_failure: Option<Duration>,
}

pub struct CircuitBreakerDecorator {
    inner: Arc<dyn CapabilityProvider>,
    config: CircuitBreakerConfig,
    circuit: Mutex<Circuit>,
}

impl CircuitBreakerDecorator {
    pub fn new(inner: Arc<dyn CapabilityProvider>) -> Self {
        Self::with_config(inner, CircuitBreakerConfig::default())
    }

    pub fn with_config(inner: Arc<dyn CapabilityProvider>, config: CircuitBreakerConfig) -> Self {
        Self {
            inner,
            config,
            circuit: Mutex::new(Circuit::closed()),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    pub async fn state(&self) -> CircuitState {
        self.circuit.lock().await.state
    }

    pub async fn stats(&self) -> CircuitStats {
        let circuit = *self.circuit.lock().await;
        CircuitStats {
            state: circuit.state,
            failure_count: circuit.failure_count,
            success_count: circuit.success_count,
            since_last_failure: circuit.last_failure_at.map(|at| at.elapsed()),
        }
    }

    /// Force the circuit closed and zero its counters
    pub async fn reset(&self) {
        *self.circuit.lock().await = Circuit::closed();
        info!(provider = self.id(), "Circuit reset");
    }

    async fn admit(&self) -> Admission {
        let mut circuit = self.circuit.lock().await;
        let (next, admission) = circuit.admit(Instant::now(), &self.config);
        *circuit = next;
        admission
    }

    async fn record(&self, outcome: CallOutcome) {
        let mut circuit = self.circuit.lock().await;
        let before = circuit.state;
        let next = circuit.record(outcome, Instant::now(), &self.config);
        *circuit = next;
        drop(circuit);

        match (before, next.state) {
            (CircuitState::Closed, CircuitState::Open) => warn!(
                provider = self.id(),
                failures = next.failure_count,
                "Circuit opened"
            ),
            (CircuitState::HalfOpen, CircuitState::Open) => {
                warn!(provider = self.id(), "Trial call failed, circuit re-opened")
            }
            (CircuitState::HalfOpen, CircuitState::Closed) => {
                info!(provider = self.id(), "Circuit closed")
            }
            _ => {}
        }
    }
}

#[async_trait]
impl CapabilityProvider for CircuitBreakerDecorator {
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
        match self.admit().await {
            Admission::Rejected => {
                debug!(provider = self.id(), tool = name, "Circuit open, call rejected");
                return Err(ProviderError::CircuitOpen {
                    provider: self.id().to_string(),
                });
            }
            Admission::Trial => {
                info!(provider = self.id(), tool = name, "Circuit half-open, admitting trial call")
            }
            Admission::Allowed => {}
        }

        let result = self.inner.execute(name, input, cancellation).await;

        match &result {
            Ok(_) => self.record(CallOutcome::Success).await,
            Err(e) if e.is_cancelled() => {}
            Err(_) => self.record(CallOutcome::Failure).await,
        }

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

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_domain::testing::{RecordingProvider, SlowHandler, SwitchableHandler};

    fn flaky_breaker(
        config: CircuitBreakerConfig,
    ) -> (CircuitBreakerDecorator, SwitchableHandler, Arc<RecordingProvider>) {
        let handler = SwitchableHandler::new();
        let provider = Arc::new(RecordingProvider::new("flaky-backend"));
        provider.push_tool(Tool::new("flaky", "Flaky tool", handler.clone()));
        let breaker = CircuitBreakerDecorator::with_config(provider.clone(), config);
        (breaker, handler, provider)
    }

    #[tokio::test]
    async fn test_opens_after_threshold_and_stops_forwarding() {
        let config = CircuitBreakerConfig::new(2, Duration::from_secs(60), 1);
        let (breaker, handler, _) = flaky_breaker(config);
        handler.set_failing(true);
        let cancel = CancellationToken::new();

        assert!(matches!(
            breaker.execute("flaky", "x", &cancel).await,
            Err(ProviderError::Execution(_))
        ));
        assert!(matches!(
            breaker.execute("flaky", "x", &cancel).await,
            Err(ProviderError::Execution(_))
        ));
        assert_eq!(breaker.state().await, CircuitState::Open);

        let err = breaker.execute("flaky", "x", &cancel).await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::CircuitOpen {
                provider: "flaky-backend".to_string()
            }
        );
        assert!(err.is_transient());
        assert_eq!(handler.calls(), 2);
    }

    #[tokio::test]
    async fn test_trial_success_closes() {
        let config = CircuitBreakerConfig::new(1, Duration::from_millis(30), 1);
        let (breaker, handler, _) = flaky_breaker(config);
        let cancel = CancellationToken::new();

        handler.set_failing(true);
        breaker.execute("flaky", "x", &cancel).await.unwrap_err();
        assert_eq!(breaker.state().await, CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(50)).await;
        handler.set_failing(false);

        assert_eq!(breaker.execute("flaky", "x", &cancel).await.unwrap(), "ok:x");
        let stats = breaker.stats().await;
        assert_eq!(stats.state, CircuitState::Closed);
        assert_eq!(stats.failure_count, 0);
        assert_eq!(stats.success_count, 0);
    }

    #[tokio::test]
    async fn test_trial_failure_reopens() {
        let config = CircuitBreakerConfig::new(1, Duration::from_millis(30), 5);
        let (breaker, handler, _) = flaky_breaker(config);
        let cancel = CancellationToken::new();

        handler.set_failing(true);
        breaker.execute("flaky", "x", &cancel).await.unwrap_err();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Trial call is forwarded and fails
        let err = breaker.execute("flaky", "x", &cancel).await.unwrap_err();
        assert!(matches!(err, ProviderError::Execution(_)));
        assert_eq!(handler.calls(), 2);
        assert_eq!(breaker.state().await, CircuitState::Open);

        // And the next call is rejected again
        let err = breaker.execute("flaky", "x", &cancel).await.unwrap_err();
        assert!(matches!(err, ProviderError::CircuitOpen { .. }));
        assert_eq!(handler.calls(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_admitted_while_half_open() {
        let config = CircuitBreakerConfig::new(1, Duration::from_millis(50), 3);
        let (breaker, handler, provider) = flaky_breaker(config);
        let slow = SlowHandler::new(Duration::from_millis(100));
        provider.push_tool(Tool::new("slow", "Slow tool", slow.clone()));
        let breaker = Arc::new(breaker);

        handler.set_failing(true);
        breaker
            .execute("flaky", "x", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(breaker.state().await, CircuitState::Open);
        tokio::time::sleep(Duration::from_millis(80)).await;

        let callers: Vec<_> = (0..3)
            .map(|i| {
                let breaker = breaker.clone();
                tokio::spawn(async move {
                    breaker
                        .execute("slow", &i.to_string(), &CancellationToken::new())
                        .await
                })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(breaker.state().await, CircuitState::HalfOpen);

        for (i, joined) in futures::future::join_all(callers).await.into_iter().enumerate() {
            assert_eq!(joined.unwrap().unwrap(), format!("slow:{}", i));
        }
        assert_eq!(slow.calls(), 3);

        // Three recorded successes meet the threshold
        let stats = breaker.stats().await;
        assert_eq!(stats.state, CircuitState::Closed);
        assert_eq!(stats.failure_count, 0);
    }

    #[tokio::test]
    async fn test_success_resets_failure_count() {
        let config = CircuitBreakerConfig::new(2, Duration::from_secs(60), 1);
        let (breaker, handler, _) = flaky_breaker(config);
        let cancel = CancellationToken::new();

        handler.set_failing(true);
        breaker.execute("flaky", "x", &cancel).await.unwrap_err();
        handler.set_failing(false);
        breaker.execute("flaky", "x", &cancel).await.unwrap();
        handler.set_failing(true);
        breaker.execute("flaky", "x", &cancel).await.unwrap_err();

        assert_eq!(breaker.state().await, CircuitState::Closed);
        assert_eq!(breaker.stats().await.failure_count, 1);
    }

    #[tokio::test]
    async fn test_cancellation_leaves_circuit_untouched() {
        let provider = Arc::new(RecordingProvider::new("slow-backend"));
        provider.push_tool(Tool::new(
            "slow",
            "Slow",
            SlowHandler::new(Duration::from_secs(5)),
        ));
        let config = CircuitBreakerConfig::new(1, Duration::from_secs(60), 1);
        let breaker = CircuitBreakerDecorator::with_config(provider, config);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = breaker.execute("slow", "x", &cancel).await.unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(breaker.state().await, CircuitState::Closed);
        assert_eq!(breaker.stats().await.failure_count, 0);
    }

    #[tokio::test]
    async fn test_reset_and_catalog_passthrough() {
        let config = CircuitBreakerConfig::new(1, Duration::from_secs(60), 1);
        let (breaker, handler, provider) = flaky_breaker(config);
        let cancel = CancellationToken::new();

        handler.set_failing(true);
        breaker.execute("flaky", "x", &cancel).await.unwrap_err();
        assert_eq!(breaker.state().await, CircuitState::Open);

        // Catalog operations still work while open
        assert_eq!(breaker.list_names().await, vec!["flaky"]);
        assert!(provider.list_count() >= 1);

        breaker.reset().await;
        let stats = breaker.stats().await;
        assert_eq!(stats.state, CircuitState::Closed);
        assert!(stats.since_last_failure.is_none());
    }
}
