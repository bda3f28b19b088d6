//! Presentation layer for tool-gateway
//!
//! This crate contains CLI definitions and output formatters.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, Commands};
pub use output::console::ConsoleFormatter;
