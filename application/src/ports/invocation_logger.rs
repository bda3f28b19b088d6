//! Port for structured invocation auditing.
//!
//! Defines the [`InvocationLogger`] trait for recording one machine-readable
//! record per tool execution (JSONL in the default adapter).
//!
//! This is separate from `tracing`-based operation logs: tracing carries the
//! human-readable diagnostics, while this port produces an audit trail.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// One finished tool execution.
#[derive(Debug, Clone)]
pub struct InvocationRecord {
    /// When the execution finished
    pub timestamp: DateTime<Utc>,
    /// Provider id the call went through
    pub provider: String,
    pub tool: String,
    /// Truncated, single-line input
    pub input_preview: String,
    pub duration: Duration,
    pub success: bool,
    /// Rendered error, when `success` is false
    pub error: Option<String>,
}

impl InvocationRecord {
    /// Create a record stamped with the current UTC time.
    pub fn new(
        provider: impl Into<String>,
        tool: impl Into<String>,
        input_preview: impl Into<String>,
        duration: Duration,
        error: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            provider: provider.into(),
            tool: tool.into(),
            input_preview: input_preview.into(),
            duration,
            success: error.is_none(),
            error,
        }
    }
}

/// Port for logging invocation records.
///
/// The `log` method is synchronous and non-fallible: an audit sink failure
/// must never change the outcome of the call being audited.
pub trait InvocationLogger: Send + Sync {
    fn log(&self, record: InvocationRecord);
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoInvocationLogger;

impl InvocationLogger for NoInvocationLogger {
    fn log(&self, _record: InvocationRecord) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_success_follows_error() {
        let ok = InvocationRecord::new("p", "echo", "hi", Duration::from_millis(3), None);
        assert!(ok.success);

        let failed = InvocationRecord::new(
            "p",
            "echo",
            "hi",
            Duration::from_millis(3),
            Some("boom".to_string()),
        );
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }
}
