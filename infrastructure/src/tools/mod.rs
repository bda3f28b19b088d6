//! In-process tools
//!
//! - `local`: [`LocalToolProvider`], an in-memory tool table
//! - `builtin`: echo, current_time and read_file, always available

pub mod builtin;
mod local;

pub use builtin::{BUILTIN_PROVIDER_ID, builtin_provider, builtin_tools};
pub use local::LocalToolProvider;
