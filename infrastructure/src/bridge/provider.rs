//! Bridge tool provider
//!
//! Exposes the tools of an external tool server as a
//! [`CapabilityProvider`]. The server is either spawned from a
//! [`FileBridgeConfig`] (stdio pipes) or attached to an existing stream.
//!
//! # Error Mapping
//!
//! | Bridge outcome | ProviderError |
//! |----------------|---------------|
//! | RPC `-32601`, or `-32602` mentioning "not found" | `ToolNotFound` |
//! | Any other RPC error | `Execution(ToolError { code: "REMOTE_ERROR" })` |
//! | Cancellation | `Cancelled` |
//! | Transport, framing or decoding failure | `NotAvailable` |

use std::process::Stdio;

use async_trait::async_trait;
use gateway_domain::{CancellationToken, CapabilityProvider, ProviderError, Tool, ToolDescriptor, ToolError};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::client::BridgeClient;
use super::error::{BridgeError, Result};
use super::protocol::{
    CallToolParams, CallToolResult, INVALID_PARAMS, ListToolsResult, METHOD_CALL_TOOL,
    METHOD_LIST_TOOLS, METHOD_NOT_FOUND,
};
use crate::config::FileBridgeConfig;

pub struct BridgeToolProvider {
    id: String,
    client: BridgeClient,
    /// Tool server child process (killed on Drop to prevent orphans).
    child: Option<Child>,
}

impl BridgeToolProvider {
    /// Attach to an already connected tool server.
    pub fn connect<R, W>(name: &str, reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            id: format!("bridge:{}", name),
            client: BridgeClient::connect(reader, writer),
            child: None,
        }
    }

    /// Whether `command` resolves to an executable on this machine
    pub fn is_available(command: &str) -> bool {
        which::which(command).is_ok()
    }

    /// Spawn the tool server described by `config` and talk to it over stdio.
    pub fn spawn(config: &FileBridgeConfig) -> Result<Self> {
        let program = which::which(&config.command)
            .map_err(|_| BridgeError::CommandNotFound(config.command.clone()))?;

        debug!(
            bridge = %config.name,
            command = %program.display(),
            args = ?config.args,
            "Spawning tool server"
        );

        let mut cmd = Command::new(&program);
        cmd.args(&config.args)
            .envs(&config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        // Linux: request kernel to send SIGTERM to child when parent dies.
        // This catches cases where Drop doesn't run (SIGKILL, OOM kill).
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd.spawn().map_err(BridgeError::SpawnError)?;
        let stdin = child.stdin.take().ok_or_else(|| {
            BridgeError::SpawnError(std::io::Error::other("Failed to capture stdin"))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            BridgeError::SpawnError(std::io::Error::other("Failed to capture stdout"))
        })?;

        info!(bridge = %config.name, pid = child.id(), "Tool server started");

        let mut provider = Self::connect(&config.name, stdout, stdin);
        provider.child = Some(child);
        Ok(provider)
    }

    /// Fetch the remote catalog, propagating failures
    pub async fn fetch_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let value = self
            .client
            .request(METHOD_LIST_TOOLS, None, &CancellationToken::new())
            .await?;
        let result: ListToolsResult = serde_json::from_value(value)
            .map_err(|e| BridgeError::UnexpectedResponse(format!("{}: {}", METHOD_LIST_TOOLS, e)))?;
        Ok(result.tools.into_iter().map(ToolDescriptor::from).collect())
    }

    fn map_call_error(&self, name: &str, error: BridgeError) -> ProviderError {
        match error {
            BridgeError::RpcError { code, .. } if code == METHOD_NOT_FOUND => {
                ProviderError::ToolNotFound(name.to_string())
            }
            BridgeError::RpcError { code, message }
                if code == INVALID_PARAMS && message.to_lowercase().contains("not found") =>
            {
                ProviderError::ToolNotFound(name.to_string())
            }
            BridgeError::RpcError { code, message } => ProviderError::Execution(
                ToolError::remote(message).with_details(format!("{} code {}", self.id, code)),
            ),
            BridgeError::Cancelled => ProviderError::Cancelled,
            other => ProviderError::NotAvailable(format!("{}: {}", self.id, other)),
        }
    }
}

#[async_trait]
impl CapabilityProvider for BridgeToolProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.try_list_tools().await.unwrap_or_else(|e| {
            warn!(provider = %self.id, error = %e, "Failed to list remote tools");
            Vec::new()
        })
    }

    async fn try_list_tools(&self) -> std::result::Result<Vec<ToolDescriptor>, ProviderError> {
        self.fetch_tools()
            .await
            .map_err(|e| ProviderError::NotAvailable(format!("{}: {}", self.id, e)))
    }

    async fn execute(
        &self,
        name: &str,
        input: &str,
        cancellation: &CancellationToken,
    ) -> std::result::Result<String, ProviderError> {
        let params = serde_json::to_value(CallToolParams {
            name: name.to_string(),
            input: input.to_string(),
        })
        .map_err(|e| ProviderError::NotAvailable(e.to_string()))?;

        let value = self
            .client
            .request(METHOD_CALL_TOOL, Some(params), cancellation)
            .await
            .map_err(|e| self.map_call_error(name, e))?;

        let result: CallToolResult = serde_json::from_value(value).map_err(|e| {
            let error =
                BridgeError::UnexpectedResponse(format!("{}: {}", METHOD_CALL_TOOL, e));
            self.map_call_error(name, error)
        })?;
        Ok(result.output)
    }

    async fn register(&self, tool: Tool) -> std::result::Result<(), ProviderError> {
        Err(ProviderError::RegistrationRejected {
            provider: self.id.clone(),
            reason: format!(
                "'{}' cannot be added, the remote server owns this catalog",
                tool.name()
            ),
        })
    }
}

impl Drop for BridgeToolProvider {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            debug!(provider = %self.id, "Killing tool server child process");
            let _ = child.start_kill();
        }
    }
}
