//! Builtin tools
//!
//! A small set of tools that keeps the gateway usable without any remote
//! tool server: `echo`, `current_time` and `read_file`.

mod basic;
mod file;

pub use basic::{CURRENT_TIME, ECHO, current_time_tool, echo_tool};
pub use file::{MAX_READ_SIZE, READ_FILE, read_file_tool};

use gateway_domain::{ProviderError, Tool};

use super::LocalToolProvider;

/// Provider id used for the builtin set
pub const BUILTIN_PROVIDER_ID: &str = "builtin";

/// Every builtin tool, in catalog order
pub fn builtin_tools() -> Vec<Tool> {
    vec![echo_tool(), current_time_tool(), read_file_tool()]
}

/// A [`LocalToolProvider`] pre-populated with [`builtin_tools`]
pub fn builtin_provider() -> Result<LocalToolProvider, ProviderError> {
    LocalToolProvider::with_tools(BUILTIN_PROVIDER_ID, builtin_tools())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_domain::CapabilityProvider;

    #[tokio::test]
    async fn test_builtin_catalog() {
        let provider = builtin_provider().unwrap();
        assert_eq!(provider.id(), "builtin");
        assert_eq!(
            provider.list_names().await,
            vec!["echo", "current_time", "read_file"]
        );
    }
}
