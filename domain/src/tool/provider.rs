//! Capability provider abstraction
//!
//! This module defines the [`CapabilityProvider`] trait, the single contract
//! consumed and exposed by every layer of the gateway.
//!
//! # Architecture
//!
//! Base providers, decorators and the aggregator all implement the same
//! trait, so a caller never knows how deep the stack is:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ToolAggregator                         │
//! │  (unions catalogs, first-listed provider wins conflicts)    │
//! └─────────────────────────────────────────────────────────────┘
//!           │                                    │
//!           ▼                                    ▼
//!    ┌──────────────┐                     ┌──────────────┐
//!    │   Logging    │                     │   Logging    │
//!    │   Metrics    │   decorator chain   │   Metrics    │
//!    │   Breaker    │   (same contract)   │   Breaker    │
//!    │   Caching    │                     │   Caching    │
//!    └──────────────┘                     └──────────────┘
//!           │                                    │
//!           ▼                                    ▼
//!    ┌──────────────┐                     ┌──────────────┐
//!    │    Local     │                     │    Bridge    │
//!    │   Provider   │                     │   Provider   │
//!    └──────────────┘                     └──────────────┘
//! ```
//!
//! # Provider Types
//!
//! - **LocalToolProvider**: in-process registry of tool handlers.
//! - **BridgeToolProvider**: proxies to an out-of-process tool server.
//! - **Decorators**: logging, metrics, caching, circuit breaking.
//! - **ToolAggregator**: composes several providers into one namespace.

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::entities::{Tool, ToolDescriptor};
use super::requirements::{check_requirements, select_required};
use super::value_objects::ToolError;

/// Error type for capability provider operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Tool does not exist in this provider's registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// No provider in an aggregate owns the requested name
    #[error("Tool not found in any provider: {0}")]
    NotRoutable(String),

    /// A tool with the same name is already registered
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    /// One or more required tools are absent from the catalog
    #[error("Missing required tools: {}", .0.join(", "))]
    MissingRequirements(Vec<String>),

    /// The circuit breaker rejected the call without invoking the backend
    #[error("Circuit open for provider '{provider}', retry later")]
    CircuitOpen { provider: String },

    /// The tool implementation itself failed
    #[error("Execution failed: {0}")]
    Execution(#[from] ToolError),

    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// Provider backend is unreachable (e.g., remote server not running)
    #[error("Provider not available: {0}")]
    NotAvailable(String),

    /// Provider does not accept the registration
    #[error("Provider '{provider}' rejected registration: {reason}")]
    RegistrationRejected { provider: String, reason: String },

    /// Registration request is malformed
    #[error("Invalid tool: {0}")]
    InvalidTool(String),

    /// An aggregate already has a member with this id
    #[error("Provider already registered: {0}")]
    DuplicateProvider(String),
}

impl ProviderError {
    /// Check if this error means the tool name could not be resolved
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProviderError::ToolNotFound(_) | ProviderError::NotRoutable(_)
        )
    }

    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProviderError::Cancelled)
    }

    /// Errors callers should treat as "try again later" rather than permanent.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::CircuitOpen { .. }
                | ProviderError::Cancelled
                | ProviderError::NotAvailable(_)
        )
    }

    /// Missing tool names, when this is a requirements failure
    pub fn missing_tools(&self) -> Option<&[String]> {
        match self {
            ProviderError::MissingRequirements(missing) => Some(missing),
            _ => None,
        }
    }
}

/// A uniform source of tools
///
/// Implementations:
/// - `LocalToolProvider`: in-process registry
/// - `BridgeToolProvider`: remote tool server over JSON-RPC
/// - `LoggingDecorator`, `MetricsDecorator`, `CachingDecorator`,
///   `CircuitBreakerDecorator`: wrap one inner provider
/// - `ToolAggregator`: routes across many providers
///
/// Every method may be called concurrently from many tasks.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    /// Identifier used in logs, metrics and conflict reports
    ///
    /// Examples: "builtin", "bridge:filesystem", "gateway"
    fn id(&self) -> &str;

    /// List every tool this provider exposes
    async fn list_tools(&self) -> Vec<ToolDescriptor>;

    /// Like [`list_tools`](Self::list_tools), but reports a catalog that
    /// could not be fetched instead of presenting it as empty
    ///
    /// Providers whose catalog lives behind a transport override this.
    async fn try_list_tools(&self) -> Result<Vec<ToolDescriptor>, ProviderError> {
        Ok(self.list_tools().await)
    }

    /// List exactly the required tools, or fail naming every missing one
    async fn list_tools_for(
        &self,
        required_names: &[String],
    ) -> Result<Vec<ToolDescriptor>, ProviderError> {
        let tools = self.list_tools().await;
        select_required(&tools, required_names)
    }

    /// Execute a tool by name
    ///
    /// The cancellation token is the caller's and must be passed down
    /// unchanged to whatever actually runs the tool.
    async fn execute(
        &self,
        name: &str,
        input: &str,
        cancellation: &CancellationToken,
    ) -> Result<String, ProviderError>;

    /// Check if this provider has a specific tool
    async fn has(&self, name: &str) -> bool {
        self.list_tools().await.iter().any(|t| t.name == name)
    }

    /// Register a new tool
    ///
    /// Duplicate names are rejected, never overwritten.
    async fn register(&self, tool: Tool) -> Result<(), ProviderError>;

    /// Confirm every required tool is available
    async fn validate_requirements(&self, required_names: &[String]) -> Result<(), ProviderError> {
        let names = self.list_names().await;
        check_requirements(names.iter().map(String::as_str), required_names)
    }

    /// Names of all tools, in catalog order
    async fn list_names(&self) -> Vec<String> {
        self.list_tools()
            .await
            .into_iter()
            .map(|t| t.name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// A provider relying on every default method
    struct MinimalProvider {
        tools: Mutex<Vec<Tool>>,
    }

    impl MinimalProvider {
        fn new(names: &[&str]) -> Self {
            let tools = names
                .iter()
                .map(|n| Tool::from_fn(*n, format!("Mock tool: {}", n), |i| Ok(i.to_string())))
                .collect();
            Self {
                tools: Mutex::new(tools),
            }
        }
    }

    #[async_trait]
    impl CapabilityProvider for MinimalProvider {
        fn id(&self) -> &str {
            "minimal"
        }

        async fn list_tools(&self) -> Vec<ToolDescriptor> {
            self.tools
                .lock()
                .unwrap()
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
            let tool = self
                .tools
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.name() == name)
                .cloned()
                .ok_or_else(|| ProviderError::ToolNotFound(name.to_string()))?;
            Ok(tool.call(input, cancellation).await?)
        }

        async fn register(&self, tool: Tool) -> Result<(), ProviderError> {
            let mut tools = self.tools.lock().unwrap();
            if tools.iter().any(|t| t.name() == tool.name()) {
                return Err(ProviderError::DuplicateTool(tool.name().to_string()));
            }
            tools.push(tool);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_default_has_and_names() {
        let provider = MinimalProvider::new(&["alpha", "beta"]);

        assert!(provider.has("alpha").await);
        assert!(!provider.has("gamma").await);
        assert_eq!(provider.list_names().await, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn test_default_validate_requirements() {
        let provider = MinimalProvider::new(&["alpha"]);

        assert!(
            provider
                .validate_requirements(&["alpha".to_string()])
                .await
                .is_ok()
        );

        let err = provider
            .validate_requirements(&["alpha".to_string(), "beta".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.missing_tools(), Some(&["beta".to_string()][..]));
    }

    #[tokio::test]
    async fn test_default_list_tools_for() {
        let provider = MinimalProvider::new(&["alpha", "beta", "gamma"]);

        let tools = provider
            .list_tools_for(&["gamma".to_string(), "alpha".to_string()])
            .await
            .unwrap();
        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["gamma", "alpha"]);
    }

    #[tokio::test]
    async fn test_default_try_list_tools_wraps_catalog() {
        let provider = MinimalProvider::new(&["alpha"]);
        let tools = provider.try_list_tools().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "alpha");
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let provider = MinimalProvider::new(&["alpha"]);
        let err = provider
            .register(Tool::from_fn("alpha", "again", |i| Ok(i.to_string())))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::DuplicateTool("alpha".to_string()));
    }

    #[tokio::test]
    async fn test_execution_error_converts_from_tool_error() {
        let provider = MinimalProvider::new(&[]);
        provider
            .register(Tool::from_fn("boom", "fails", |_| {
                Err(ToolError::execution_failed("exploded"))
            }))
            .await
            .unwrap();

        let err = provider
            .execute("boom", "", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Execution(ref e) if e.code == "EXECUTION_FAILED"));
    }

    #[test]
    fn test_error_classification() {
        assert!(ProviderError::ToolNotFound("x".into()).is_not_found());
        assert!(ProviderError::NotRoutable("x".into()).is_not_found());
        assert!(!ProviderError::Cancelled.is_not_found());

        assert!(ProviderError::Cancelled.is_cancelled());
        assert!(ProviderError::Cancelled.is_transient());
        assert!(
            ProviderError::CircuitOpen {
                provider: "p".into()
            }
            .is_transient()
        );
        assert!(!ProviderError::Execution(ToolError::execution_failed("x")).is_transient());
    }

    #[test]
    fn test_missing_requirements_message_lists_all() {
        let err = ProviderError::MissingRequirements(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Missing required tools: a, b");
    }
}
