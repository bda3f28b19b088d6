//! JSON-RPC protocol types for tool server communication.
//!
//! # Methods
//!
//! | Method | Params | Result |
//! |--------|--------|--------|
//! | `tools/list` | none | `{"tools": [{"name", "description"}]}` |
//! | `tools/call` | `{"name", "input"}` | `{"output": string}` |

use gateway_domain::ToolDescriptor;
use serde::{Deserialize, Serialize};

pub const METHOD_LIST_TOOLS: &str = "tools/list";
pub const METHOD_CALL_TOOL: &str = "tools/call";

/// Standard JSON-RPC code for an unknown method or tool
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Standard JSON-RPC code for bad parameters
pub const INVALID_PARAMS: i64 = -32602;

/// JSON-RPC request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: u64, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: u64, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Tool entry in a `tools/list` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteTool {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl From<RemoteTool> for ToolDescriptor {
    fn from(tool: RemoteTool) -> Self {
        ToolDescriptor::new(tool.name, tool.description)
    }
}

/// `tools/list` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResult {
    pub tools: Vec<RemoteTool>,
}

/// `tools/call` params
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub input: String,
}

/// `tools/call` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolResult {
    pub output: String,
}
