//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for tool-gateway
#[derive(Parser, Debug)]
#[command(name = "tool-gateway")]
#[command(author, version, about = "Tool invocation gateway - one catalog over many tool providers")]
#[command(long_about = r#"
tool-gateway puts the builtin tools and any configured remote tool servers
behind a single catalog. Every call goes through the decorator chain:

  Logging -> Metrics -> CircuitBreaker -> Caching -> provider

Configuration is merged from (lowest to highest priority):
1. Built-in defaults
2. ~/.config/tool-gateway/config.toml   Global config
3. ./gateway.toml or ./.gateway.toml    Project-level config
4. --config <path>                      Explicit config file
5. TOOL_GATEWAY_* environment variables (e.g. TOOL_GATEWAY_CACHE__TTL_SECONDS=60)

Example:
  tool-gateway list
  tool-gateway call echo --input '{"hello":"world"}' --repeat 3 --stats
  tool-gateway validate read_file current_time
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the aggregate tool catalog
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Execute a tool through the full decorator chain
    Call {
        /// Tool name
        tool: String,

        /// Input passed to the tool (conventionally JSON)
        #[arg(short, long, default_value = "")]
        input: String,

        /// Run the call this many times
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        repeat: u32,

        /// Print metrics, cache and circuit statistics afterwards
        #[arg(long)]
        stats: bool,
    },

    /// Check that every named tool is available (exit code 1 if not)
    Validate {
        /// Required tool names
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },

    /// Show configuration sources and the effective configuration
    Config,
}
