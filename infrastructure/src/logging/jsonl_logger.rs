//! JSONL file writer for invocation records.
//!
//! Each [`InvocationRecord`] is serialized as a single JSON line and
//! appended to the file via a buffered writer.

use gateway_application::ports::invocation_logger::{InvocationLogger, InvocationRecord};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL invocation logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlInvocationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlInvocationLogger {
    /// Open (or create) the audit file at `path` in append mode.
    ///
    /// Creates parent directories if needed. Returns `None` if the file
    /// cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create audit log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open audit log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn to_json(record: &InvocationRecord) -> serde_json::Value {
    serde_json::json!({
        "timestamp": record
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "provider": record.provider,
        "tool": record.tool,
        "input_preview": record.input_preview,
        "duration_ms": record.duration.as_millis() as u64,
        "success": record.success,
        "error": record.error,
    })
}

impl InvocationLogger for JsonlInvocationLogger {
    fn log(&self, record: InvocationRecord) {
        let line = match serde_json::to_string(&to_json(&record)) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Could not serialize invocation record");
                return;
            }
        };

        match self.writer.lock() {
            Ok(mut writer) => {
                // Flush per record
                if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
                    warn!(path = %self.path.display(), error = %e, "Could not write audit record");
                }
            }
            Err(_) => warn!(path = %self.path.display(), "Audit log writer poisoned"),
        }
    }
}

impl Drop for JsonlInvocationLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit").join("invocations.jsonl");
        let logger = JsonlInvocationLogger::new(&path).unwrap();
        assert_eq!(logger.path(), path);

        logger.log(InvocationRecord::new(
            "builtin",
            "echo",
            "hello",
            Duration::from_millis(12),
            None,
        ));
        logger.log(InvocationRecord::new(
            "bridge:fs",
            "read_file",
            "{\"path\":\"x\"}",
            Duration::from_millis(3),
            Some("Tool not found: read_file".to_string()),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);

        assert_eq!(lines[0]["provider"], "builtin");
        assert_eq!(lines[0]["tool"], "echo");
        assert_eq!(lines[0]["input_preview"], "hello");
        assert_eq!(lines[0]["duration_ms"], 12);
        assert_eq!(lines[0]["success"], true);
        assert!(lines[0]["error"].is_null());
        let ts = lines[0]["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());

        assert_eq!(lines[1]["success"], false);
        assert_eq!(lines[1]["error"], "Tool not found: read_file");
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invocations.jsonl");

        for _ in 0..2 {
            let logger = JsonlInvocationLogger::new(&path).unwrap();
            logger.log(InvocationRecord::new("p", "t", "", Duration::ZERO, None));
        }

        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn test_directory_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JsonlInvocationLogger::new(dir.path()).is_none());
    }
}
