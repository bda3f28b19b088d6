//! `[providers]` section: builtin tools and remote tool server bridges

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `[providers]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    pub builtin: FileBuiltinConfig,
    /// `[[providers.bridges]]`, in priority order
    pub bridges: Vec<FileBridgeConfig>,
}

/// `[providers.builtin]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBuiltinConfig {
    pub enabled: bool,
}

impl Default for FileBuiltinConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// One external tool server, spawned over stdio
///
/// ```toml
/// [[providers.bridges]]
/// name = "filesystem"
/// command = "fs-tool-server"
/// args = ["--stdio"]
/// env = { FS_ROOT = "/srv" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBridgeConfig {
    /// Provider id becomes `bridge:<name>`
    pub name: String,
    /// Executable, resolved through `PATH`
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}
