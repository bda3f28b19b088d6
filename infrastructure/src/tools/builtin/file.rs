//! read_file builtin tool
//!
//! Input is a JSON object:
//!
//! ```json
//! { "path": "notes.txt", "offset": 10, "limit": 20 }
//! ```
//!
//! `offset` (0-indexed line) and `limit` (line count) are optional.

use std::io::ErrorKind;

use async_trait::async_trait;
use gateway_domain::{CancellationToken, Tool, ToolError, ToolHandler};
use serde::Deserialize;

pub const READ_FILE: &str = "read_file";

/// Maximum file size to read (10 MB)
pub const MAX_READ_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct ReadFileArgs {
    path: String,
    #[serde(default)]
    offset: Option<usize>,
    #[serde(default)]
    limit: Option<usize>,
}

struct ReadFileHandler;

pub fn read_file_tool() -> Tool {
    Tool::new(
        READ_FILE,
        "Read a UTF-8 text file. Input: {\"path\": string, \"offset\"?: number, \"limit\"?: number}",
        ReadFileHandler,
    )
}

#[async_trait]
impl ToolHandler for ReadFileHandler {
    async fn call(
        &self,
        input: &str,
        _cancellation: &CancellationToken,
    ) -> Result<String, ToolError> {
        let args: ReadFileArgs = serde_json::from_str(input).map_err(|e| {
            ToolError::invalid_argument(format!("expected {{\"path\": ...}}: {}", e))
        })?;
        let path = args.path.as_str();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| io_error(path, e))?;

        if !metadata.is_file() {
            return Err(ToolError::invalid_argument(format!(
                "'{}' is not a file",
                path
            )));
        }

        if metadata.len() > MAX_READ_SIZE {
            return Err(ToolError::invalid_argument(format!(
                "File too large ({} bytes). Maximum size is {} bytes",
                metadata.len(),
                MAX_READ_SIZE
            )));
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| io_error(path, e))?;

        Ok(select_lines(content, args.offset, args.limit))
    }
}

fn io_error(path: &str, e: std::io::Error) -> ToolError {
    match e.kind() {
        ErrorKind::NotFound => ToolError::not_found(path),
        ErrorKind::PermissionDenied => ToolError::permission_denied(path),
        _ => ToolError::execution_failed(format!("Failed to read file: {}", e)),
    }
}

fn select_lines(content: String, offset: Option<usize>, limit: Option<usize>) -> String {
    let offset = offset.unwrap_or(0);
    if offset == 0 && limit.is_none() {
        return content;
    }

    let lines: Vec<&str> = content.lines().collect();
    if offset >= lines.len() {
        return String::new();
    }
    let end = match limit {
        Some(l) => offset.saturating_add(l).min(lines.len()),
        None => lines.len(),
    };
    lines[offset..end].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    async fn read(input: serde_json::Value) -> Result<String, ToolError> {
        read_file_tool()
            .call(&input.to_string(), &CancellationToken::new())
            .await
    }

    fn sample() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "one\ntwo\nthree\nfour").unwrap();
        file
    }

    #[tokio::test]
    async fn test_reads_whole_file() {
        let file = sample();
        let out = read(serde_json::json!({"path": file.path()})).await.unwrap();
        assert_eq!(out, "one\ntwo\nthree\nfour");
    }

    #[tokio::test]
    async fn test_offset_and_limit() {
        let file = sample();
        let out = read(serde_json::json!({"path": file.path(), "offset": 1, "limit": 2}))
            .await
            .unwrap();
        assert_eq!(out, "two\nthree");

        let out = read(serde_json::json!({"path": file.path(), "offset": 10}))
            .await
            .unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = read(serde_json::json!({"path": "/definitely/not/here.txt"}))
            .await
            .unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_directory_and_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = read(serde_json::json!({"path": dir.path()}))
            .await
            .unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");

        let err = read_file_tool()
            .call("not json", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");
    }
}
