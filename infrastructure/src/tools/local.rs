//! In-process tool provider
//!
//! [`LocalToolProvider`] holds [`Tool`]s in memory and runs their handlers
//! on the caller's task. The catalog preserves registration order.

use std::collections::HashMap;

use async_trait::async_trait;
use gateway_domain::{CancellationToken, CapabilityProvider, ProviderError, Tool, ToolDescriptor};
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Tools by name plus their registration order
#[derive(Default)]
struct ToolTable {
    by_name: HashMap<String, Tool>,
    order: Vec<String>,
}

impl ToolTable {
    fn insert(&mut self, owner: &str, tool: Tool) -> Result<(), ProviderError> {
        let name = tool.name().to_string();
        if name.trim().is_empty() {
            return Err(ProviderError::InvalidTool(format!(
                "{}: tool name must not be empty",
                owner
            )));
        }
        if self.by_name.contains_key(&name) {
            return Err(ProviderError::DuplicateTool(name));
        }
        self.order.push(name.clone());
        self.by_name.insert(name, tool);
        Ok(())
    }

    fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.order
            .iter()
            .filter_map(|name| self.by_name.get(name))
            .map(|tool| tool.descriptor().clone())
            .collect()
    }
}

/// Provider backed by an in-memory tool table
pub struct LocalToolProvider {
    id: String,
    tools: RwLock<ToolTable>,
}

impl LocalToolProvider {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tools: RwLock::new(ToolTable::default()),
        }
    }

    /// Build a provider pre-populated with `tools`.
    ///
    /// Fails on the first empty or duplicate name.
    pub fn with_tools(
        id: impl Into<String>,
        tools: impl IntoIterator<Item = Tool>,
    ) -> Result<Self, ProviderError> {
        let id = id.into();
        let mut table = ToolTable::default();
        for tool in tools {
            table.insert(&id, tool)?;
        }
        Ok(Self {
            id,
            tools: RwLock::new(table),
        })
    }

    pub async fn len(&self) -> usize {
        self.tools.read().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CapabilityProvider for LocalToolProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.tools.read().await.descriptors()
    }

    async fn has(&self, name: &str) -> bool {
        self.tools.read().await.by_name.contains_key(name)
    }

    async fn execute(
        &self,
        name: &str,
        input: &str,
        cancellation: &CancellationToken,
    ) -> Result<String, ProviderError> {
        if cancellation.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        // Clone the tool so no lock is held while the handler runs
        let tool = self
            .tools
            .read()
            .await
            .by_name
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::ToolNotFound(name.to_string()))?;

        trace!(provider = %self.id, tool = name, "Running local tool");
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(ProviderError::Cancelled),
            result = tool.call(input, cancellation) => result.map_err(ProviderError::from),
        }
    }

    async fn register(&self, tool: Tool) -> Result<(), ProviderError> {
        let name = tool.name().to_string();
        self.tools.write().await.insert(&self.id, tool)?;
        debug!(provider = %self.id, tool = %name, "Tool registered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_domain::ToolError;
    use gateway_domain::testing::SlowHandler;
    use std::time::Duration;

    fn upper() -> Tool {
        Tool::from_fn("upper", "Upper-case input", |i| Ok(i.to_uppercase()))
    }

    #[tokio::test]
    async fn test_register_and_execute() {
        let provider = LocalToolProvider::new("local");
        assert!(provider.is_empty().await);

        provider.register(upper()).await.unwrap();
        provider
            .register(Tool::from_fn("lower", "Lower-case input", |i| {
                Ok(i.to_lowercase())
            }))
            .await
            .unwrap();

        assert_eq!(provider.list_names().await, vec!["upper", "lower"]);
        let out = provider
            .execute("upper", "abc", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out, "ABC");
    }

    #[tokio::test]
    async fn test_duplicate_and_empty_names_rejected() {
        let provider = LocalToolProvider::with_tools("local", [upper()]).unwrap();

        let err = provider.register(upper()).await.unwrap_err();
        assert_eq!(err, ProviderError::DuplicateTool("upper".into()));

        let err = provider
            .register(Tool::from_fn("  ", "blank", |i| Ok(i.to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidTool(_)));
        assert_eq!(provider.len().await, 1);

        assert!(LocalToolProvider::with_tools("local", [upper(), upper()]).is_err());
    }

    #[tokio::test]
    async fn test_unknown_tool_and_tool_failure() {
        let provider = LocalToolProvider::with_tools(
            "local",
            [Tool::from_fn("fail", "Always fails", |_| {
                Err(ToolError::execution_failed("boom"))
            })],
        )
        .unwrap();
        let cancel = CancellationToken::new();

        let err = provider.execute("missing", "", &cancel).await.unwrap_err();
        assert!(err.is_not_found());

        let err = provider.execute("fail", "", &cancel).await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::Execution(ToolError::execution_failed("boom"))
        );
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_slow_tool() {
        let provider = LocalToolProvider::with_tools(
            "local",
            [Tool::new(
                "slow",
                "Sleeps",
                SlowHandler::new(Duration::from_secs(10)),
            )],
        )
        .unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = provider.execute("slow", "x", &cancel).await.unwrap_err();
        assert_eq!(err, ProviderError::Cancelled);

        let err = provider.execute("slow", "x", &cancel).await.unwrap_err();
        assert_eq!(err, ProviderError::Cancelled);
    }

    #[tokio::test]
    async fn test_requirements() {
        let provider = LocalToolProvider::with_tools("local", [upper()]).unwrap();
        assert!(
            provider
                .validate_requirements(&["upper".to_string()])
                .await
                .is_ok()
        );
        let err = provider
            .validate_requirements(&["upper".to_string(), "zip".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.missing_tools(), Some(&["zip".to_string()][..]));
    }
}
