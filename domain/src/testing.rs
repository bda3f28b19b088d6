//! Test doubles shared by the workspace crates.
//!
//! Enabled with the `testing` feature so the application and infrastructure
//! crates can drive decorators and the aggregator without real backends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::tool::entities::{Tool, ToolDescriptor, ToolHandler};
use crate::tool::provider::{CapabilityProvider, ProviderError};
use crate::tool::value_objects::ToolError;

/// In-memory provider that counts how often each tool reached it.
pub struct RecordingProvider {
    id: String,
    tools: Mutex<Vec<Tool>>,
    calls: Mutex<HashMap<String, usize>>,
    list_calls: AtomicUsize,
    reject_registration: bool,
}

impl RecordingProvider {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tools: Mutex::new(Vec::new()),
            calls: Mutex::new(HashMap::new()),
            list_calls: AtomicUsize::new(0),
            reject_registration: false,
        }
    }

    /// Provider exposing echo tools named after `names`.
    ///
    /// Each tool answers `"<id>:<input>"` so tests can see who served a call.
    pub fn with_echo_tools(id: impl Into<String>, names: &[&str]) -> Self {
        let provider = Self::new(id);
        let tag = provider.id.clone();
        {
            let mut tools = provider.lock_tools();
            for name in names {
                let tag = tag.clone();
                tools.push(Tool::from_fn(
                    *name,
                    format!("Echo tool {} from {}", name, tag),
                    move |input| Ok(format!("{}:{}", tag, input)),
                ));
            }
        }
        provider
    }

    /// Make [`CapabilityProvider::register`] always fail.
    pub fn rejecting_registration(mut self) -> Self {
        self.reject_registration = true;
        self
    }

    /// Add a tool directly, bypassing registration checks.
    pub fn push_tool(&self, tool: Tool) {
        self.lock_tools().push(tool);
    }

    /// Times `name` reached this provider's `execute`
    pub fn call_count(&self, name: &str) -> usize {
        self.lock_calls().get(name).copied().unwrap_or(0)
    }

    /// Total `execute` calls across all names
    pub fn total_calls(&self) -> usize {
        self.lock_calls().values().sum()
    }

    /// Times the catalog was listed
    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn lock_tools(&self) -> std::sync::MutexGuard<'_, Vec<Tool>> {
        self.tools.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, HashMap<String, usize>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CapabilityProvider for RecordingProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.lock_tools()
            .iter()
            .map(|t| t.descriptor().clone())
            .collect()
    }

    async fn execute(
        &self,
        name: &str,
        input: &str,
        cancellation: &CancellationToken,
    ) -> Result<String, ProviderError> {
        *self.lock_calls().entry(name.to_string()).or_insert(0) += 1;

        let tool = self
            .lock_tools()
            .iter()
            .find(|t| t.name() == name)
            .cloned()
            .ok_or_else(|| ProviderError::ToolNotFound(name.to_string()))?;

        tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(ProviderError::Cancelled),
            result = tool.call(input, cancellation) => result.map_err(ProviderError::from),
        }
    }

    async fn register(&self, tool: Tool) -> Result<(), ProviderError> {
        if self.reject_registration {
            return Err(ProviderError::RegistrationRejected {
                provider: self.id.clone(),
                reason: "read-only".to_string(),
            });
        }
        let mut tools = self.lock_tools();
        if tools.iter().any(|t| t.name() == tool.name()) {
            return Err(ProviderError::DuplicateTool(tool.name().to_string()));
        }
        tools.push(tool);
        Ok(())
    }
}

/// Handler whose failure mode is flipped from the test body.
#[derive(Clone, Default)]
pub struct SwitchableHandler {
    failing: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl SwitchableHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolHandler for SwitchableHandler {
    async fn call(
        &self,
        input: &str,
        _cancellation: &CancellationToken,
    ) -> Result<String, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            Err(ToolError::execution_failed("backend unavailable"))
        } else {
            Ok(format!("ok:{}", input))
        }
    }
}

/// Handler that takes `delay` to answer unless cancelled first.
#[derive(Clone)]
pub struct SlowHandler {
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl SlowHandler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolHandler for SlowHandler {
    async fn call(&self, input: &str, cancellation: &CancellationToken) -> Result<String, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::select! {
            _ = cancellation.cancelled() => Err(ToolError::new("CANCELLED", "cancelled by caller")),
            _ = tokio::time::sleep(self.delay) => Ok(format!("slow:{}", input)),
        }
    }
}
