//! Tool domain entities

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::value_objects::ToolError;

/// Catalog entry for a tool: what callers see when they list a provider.
///
/// Owned by whichever provider registered it. Immutable once published.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique name of the tool within its provider (e.g., "read_file")
    pub name: String,
    /// Human-readable description
    pub description: String,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Executable implementation behind a tool.
///
/// The cancellation token is the caller's; implementations doing slow work
/// should observe it and return early.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, input: &str, cancellation: &CancellationToken)
    -> Result<String, ToolError>;
}

/// Adapter turning a synchronous closure into a [`ToolHandler`].
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&str) -> Result<String, ToolError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> ToolHandler for FnHandler<F>
where
    F: Fn(&str) -> Result<String, ToolError> + Send + Sync,
{
    async fn call(
        &self,
        input: &str,
        _cancellation: &CancellationToken,
    ) -> Result<String, ToolError> {
        (self.f)(input)
    }
}

/// A named, independently invokable capability.
///
/// Cheap to clone: the handler is shared.
#[derive(Clone)]
pub struct Tool {
    descriptor: ToolDescriptor,
    handler: Arc<dyn ToolHandler>,
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: impl ToolHandler + 'static,
    ) -> Self {
        Self {
            descriptor: ToolDescriptor::new(name, description),
            handler: Arc::new(handler),
        }
    }

    /// Build a tool from a synchronous closure.
    pub fn from_fn<F>(name: impl Into<String>, description: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self::new(name, description, FnHandler::new(f))
    }

    /// Build a tool around an already shared handler.
    pub fn with_handler(descriptor: ToolDescriptor, handler: Arc<dyn ToolHandler>) -> Self {
        Self {
            descriptor,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn description(&self) -> &str {
        &self.descriptor.description
    }

    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }

    /// Invoke the underlying handler.
    pub async fn call(
        &self,
        input: &str,
        cancellation: &CancellationToken,
    ) -> Result<String, ToolError> {
        self.handler.call(input, cancellation).await
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.descriptor.name)
            .field("description", &self.descriptor.description)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_serialization() {
        let descriptor = ToolDescriptor::new("echo", "Echo input back");
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["name"], "echo");
        assert_eq!(json["description"], "Echo input back");
    }

    #[tokio::test]
    async fn test_tool_from_fn() {
        let tool = Tool::from_fn("shout", "Upper-case the input", |input| {
            Ok(input.to_uppercase())
        });

        assert_eq!(tool.name(), "shout");
        assert_eq!(tool.description(), "Upper-case the input");

        let out = tool.call("hi", &CancellationToken::new()).await.unwrap();
        assert_eq!(out, "HI");
    }

    #[tokio::test]
    async fn test_tool_failure_passes_through() {
        let tool = Tool::from_fn("fail", "Always fails", |_| {
            Err(ToolError::execution_failed("nope"))
        });

        let err = tool.call("x", &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.code, "EXECUTION_FAILED");
    }

    #[test]
    fn test_tool_clone_shares_handler() {
        let tool = Tool::from_fn("echo", "Echo", |i| Ok(i.to_string()));
        let copy = tool.clone();
        assert!(Arc::ptr_eq(tool.handler(), copy.handler()));
    }

    #[test]
    fn test_tool_debug_hides_handler() {
        let tool = Tool::from_fn("echo", "Echo", |i| Ok(i.to_string()));
        let rendered = format!("{:?}", tool);
        assert!(rendered.contains("echo"));
        assert!(rendered.contains(".."));
    }
}
