//! Error types for the tool bridge

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur when talking to a bridged tool server
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Tool server command not found: {0}")]
    CommandNotFound(String),

    #[error("Failed to spawn tool server: {0}")]
    SpawnError(std::io::Error),

    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Malformed frame: {0}")]
    InvalidFrame(String),

    #[error("JSON-RPC error (code {code}): {message}")]
    RpcError { code: i64, message: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Transport closed")]
    TransportClosed,

    #[error("Request cancelled")]
    Cancelled,
}
