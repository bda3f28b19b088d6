//! Logging decorator
//!
//! Wraps every operation in a pair of `tracing` records. Failures of the inner
//! provider are logged at WARN and returned unchanged. When an
//! [`InvocationLogger`] is attached, each `execute` also produces one audit
//! record.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use gateway_domain::util::preview;
use gateway_domain::{CancellationToken, CapabilityProvider, ProviderError, Tool, ToolDescriptor};
use tracing::{debug, info, warn};

use crate::ports::invocation_logger::{InvocationLogger, InvocationRecord, NoInvocationLogger};

const DEFAULT_PREVIEW_CHARS: usize = 200;

pub struct LoggingDecorator {
    inner: Arc<dyn CapabilityProvider>,
    audit: Arc<dyn InvocationLogger>,
    preview_chars: usize,
}

impl LoggingDecorator {
    pub fn new(inner: Arc<dyn CapabilityProvider>) -> Self {
        Self {
            inner,
            audit: Arc::new(NoInvocationLogger),
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }

    /// Attach an audit sink receiving one record per execution
    pub fn with_audit(mut self, audit: Arc<dyn InvocationLogger>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }
}

#[async_trait]
impl CapabilityProvider for LoggingDecorator {
    fn id(&self) -> &str {
        self.inner.id()
    }

    async fn list_tools(&self) -> Vec<ToolDescriptor> {
        let started = Instant::now();
        debug!(provider = self.id(), "Listing tools");
        let tools = self.inner.list_tools().await;
        debug!(
            provider = self.id(),
            count = tools.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Listed tools"
        );
        tools
    }

    async fn try_list_tools(&self) -> Result<Vec<ToolDescriptor>, ProviderError> {
        let result = self.inner.try_list_tools().await;
        if let Err(e) = &result {
            warn!(provider = self.id(), error = %e, "Tool catalog unavailable");
        }
        result
    }

    async fn list_tools_for(
        &self,
        required_names: &[String],
    ) -> Result<Vec<ToolDescriptor>, ProviderError> {
        debug!(provider = self.id(), required = ?required_names, "Listing required tools");
        let result = self.inner.list_tools_for(required_names).await;
        match &result {
            Ok(tools) => debug!(provider = self.id(), count = tools.len(), "Listed required tools"),
            Err(e) => warn!(provider = self.id(), error = %e, "Required tools unavailable"),
        }
        result
    }

    async fn execute(
        &self,
        name: &str,
        input: &str,
        cancellation: &CancellationToken,
    ) -> Result<String, ProviderError> {
        let input_preview = preview(input, self.preview_chars);
        let started = Instant::now();
        debug!(
            provider = self.id(),
            tool = name,
            input = %input_preview,
            "Executing tool"
        );

        let result = self.inner.execute(name, input, cancellation).await;
        let duration = started.elapsed();
        let duration_ms = duration.as_millis() as u64;

        match &result {
            Ok(output) => info!(
                provider = self.id(),
                tool = name,
                duration_ms,
                output_bytes = output.len(),
                "Tool execution succeeded"
            ),
            Err(e) => warn!(
                provider = self.id(),
                tool = name,
                duration_ms,
                error = %e,
                "Tool execution failed"
            ),
        }

        self.audit.log(InvocationRecord::new(
            self.id(),
            name,
            input_preview,
            duration,
            result.as_ref().err().map(ToString::to_string),
        ));

        result
    }

    async fn has(&self, name: &str) -> bool {
        let found = self.inner.has(name).await;
        debug!(provider = self.id(), tool = name, found, "Checked tool");
        found
    }

    async fn register(&self, tool: Tool) -> Result<(), ProviderError> {
        let name = tool.name().to_string();
        debug!(provider = self.id(), tool = %name, "Registering tool");
        let result = self.inner.register(tool).await;
        match &result {
            Ok(()) => info!(provider = self.id(), tool = %name, "Registered tool"),
            Err(e) => warn!(provider = self.id(), tool = %name, error = %e, "Registration failed"),
        }
        result
    }

    async fn validate_requirements(&self, required_names: &[String]) -> Result<(), ProviderError> {
        debug!(provider = self.id(), required = ?required_names, "Validating requirements");
        let result = self.inner.validate_requirements(required_names).await;
        if let Err(e) = &result {
            warn!(provider = self.id(), error = %e, "Requirement validation failed");
        }
        result
    }

    async fn list_names(&self) -> Vec<String> {
        let names = self.inner.list_names().await;
        debug!(provider = self.id(), count = names.len(), "Listed tool names");
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_domain::ToolError;
    use gateway_domain::testing::RecordingProvider;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingLogger {
        records: Mutex<Vec<InvocationRecord>>,
    }

    impl InvocationLogger for CollectingLogger {
        fn log(&self, record: InvocationRecord) {
            self.records.lock().unwrap().push(record);
        }
    }

    fn provider() -> Arc<RecordingProvider> {
        let provider = RecordingProvider::with_echo_tools("p1", &["echo"]);
        provider.push_tool(Tool::from_fn("fail", "Always fails", |_| {
            Err(ToolError::execution_failed("boom"))
        }));
        Arc::new(provider)
    }

    #[tokio::test]
    async fn test_result_passes_through_unchanged() {
        let inner = provider();
        let decorator = LoggingDecorator::new(inner.clone());

        let out = decorator
            .execute("echo", "hi", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out, "p1:hi");
        assert_eq!(inner.call_count("echo"), 1);
        assert_eq!(decorator.id(), "p1");
    }

    #[tokio::test]
    async fn test_error_passes_through_unchanged() {
        let decorator = LoggingDecorator::new(provider());

        let err = decorator
            .execute("fail", "x", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ProviderError::Execution(ToolError::execution_failed("boom"))
        );
    }

    #[tokio::test]
    async fn test_audit_records_each_execution() {
        let audit = Arc::new(CollectingLogger::default());
        let decorator = LoggingDecorator::new(provider())
            .with_audit(audit.clone())
            .with_preview_chars(4);

        let cancel = CancellationToken::new();
        decorator.execute("echo", "hello world", &cancel).await.unwrap();
        let _ = decorator.execute("fail", "x", &cancel).await;

        let records = audit.records.lock().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tool, "echo");
        assert_eq!(records[0].input_preview, "hell...");
        assert!(records[0].success);
        assert!(!records[1].success);
        assert!(records[1].error.as_deref().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn test_catalog_operations_forwarded() {
        let decorator = LoggingDecorator::new(provider());

        assert_eq!(decorator.list_names().await, vec!["echo", "fail"]);
        assert!(decorator.has("echo").await);
        assert!(
            decorator
                .validate_requirements(&["missing".to_string()])
                .await
                .is_err()
        );
        decorator
            .register(Tool::from_fn("new", "New tool", |i| Ok(i.to_string())))
            .await
            .unwrap();
        assert_eq!(decorator.list_tools().await.len(), 3);
    }
}
