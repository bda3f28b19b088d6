//! Tool domain value objects: the failure raised by a tool implementation
//!
//! A [`ToolError`] is what a [`ToolHandler`](super::entities::ToolHandler)
//! returns when the tool itself fails. Providers wrap it in
//! [`ProviderError::Execution`](super::provider::ProviderError::Execution)
//! and every decorator passes it through unchanged.

use serde::{Deserialize, Serialize};

/// Error raised by a tool implementation.
///
/// | Code | Description |
/// |------|-------------|
/// | `INVALID_ARGUMENT` | Input could not be parsed or is missing fields |
/// | `NOT_FOUND` | A resource the tool needed does not exist |
/// | `EXECUTION_FAILED` | Runtime failure (I/O error, non-zero exit, ...) |
/// | `PERMISSION_DENIED` | Access denied |
/// | `REMOTE_ERROR` | A remote tool server reported a failure |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "PERMISSION_DENIED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Common error constructors
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            "NOT_FOUND",
            format!("Resource not found: {}", resource.into()),
        )
    }

    pub fn permission_denied(resource: impl Into<String>) -> Self {
        Self::new(
            "PERMISSION_DENIED",
            format!("Permission denied: {}", resource.into()),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::new("REMOTE_ERROR", message)
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error() {
        let err = ToolError::not_found("/path/to/file").with_details("File does not exist");

        assert_eq!(err.code, "NOT_FOUND");
        assert!(err.message.contains("/path/to/file"));
        assert!(err.details.is_some());
    }

    #[test]
    fn test_tool_error_display() {
        let err = ToolError::remote("server exploded").with_details("exit 3");
        assert_eq!(err.to_string(), "[REMOTE_ERROR] server exploded (exit 3)");

        let plain = ToolError::invalid_argument("missing 'path'");
        assert_eq!(plain.to_string(), "[INVALID_ARGUMENT] missing 'path'");
    }

    #[test]
    fn test_tool_error_json_omits_empty_details() {
        let json = serde_json::to_value(ToolError::execution_failed("fetch")).unwrap();
        assert_eq!(json["code"], "EXECUTION_FAILED");
        assert!(json.get("details").is_none());
    }
}
