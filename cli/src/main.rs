//! CLI entrypoint for tool-gateway
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use gateway_application::{
    ChainBuilder, InvocationLogger, InvokeToolInput, NoInvocationLogger, ToolGateway,
};
use gateway_domain::CancellationToken;
use gateway_infrastructure::{
    BridgeToolProvider, ConfigLoader, FileConfig, JsonlInvocationLogger, builtin_provider,
};
use gateway_presentation::{Cli, Commands, ConsoleFormatter};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, prelude::*};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines reach the file
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting tool-gateway");

    if let Commands::Config = cli.command {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        let config = load_config(&cli)?;
        println!();
        println!("{}", ConsoleFormatter::format_json(&config));
        for issue in config.validate() {
            eprint!("{}", ConsoleFormatter::warning(&issue.to_string()));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&cli)?;
    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprint!("{}", ConsoleFormatter::warning(&issue.to_string()));
        }
        bail!("Invalid configuration ({} issues)", issues.len());
    }

    // === Dependency Injection ===
    let gateway = build_gateway(&config).await?;

    match cli.command {
        Commands::List { json } => {
            let catalog = gateway.catalog().await;
            if json {
                println!("{}", ConsoleFormatter::format_json(&catalog));
            } else {
                print!("{}", ConsoleFormatter::format_catalog(&catalog));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Call {
            tool,
            input,
            repeat,
            stats,
        } => {
            let cancellation = CancellationToken::new();
            let on_interrupt = cancellation.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling in-flight call");
                    on_interrupt.cancel();
                }
            });

            let output = gateway
                .invoke(
                    InvokeToolInput::new(tool, input).with_repeat(repeat as usize),
                    &cancellation,
                )
                .await;
            print!("{}", ConsoleFormatter::format_invocation(&output));

            if stats {
                print!("{}", ConsoleFormatter::format_stats(&gateway.stats().await));
            }

            Ok(match output.last() {
                Some(Ok(_)) => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            })
        }
        Commands::Validate { names } => {
            let result = gateway.validate(&names).await;
            print!("{}", ConsoleFormatter::format_validation(&result));
            Ok(if result.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Config => Ok(ExitCode::SUCCESS),
    }
}

/// Console logging filtered by `-v`, plus an optional plain-text log file.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("--log-file must name a file: {}", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Could not create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialise logging: {}", e))?;

    Ok(guard)
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_deref())
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))
}

/// Builtin provider first, then each bridge in config order.
///
/// Earlier providers win name conflicts. A bridge that cannot be started is
/// skipped with a warning; two providers sharing an id is an error.
async fn build_gateway(config: &FileConfig) -> Result<ToolGateway> {
    let audit: Arc<dyn InvocationLogger> = match &config.logging.audit_log {
        Some(path) => match JsonlInvocationLogger::new(path) {
            Some(logger) => Arc::new(logger),
            None => {
                eprint!(
                    "{}",
                    ConsoleFormatter::warning(&format!(
                        "audit log {} unavailable, continuing without it",
                        path.display()
                    ))
                );
                Arc::new(NoInvocationLogger)
            }
        },
        None => Arc::new(NoInvocationLogger),
    };

    let params = config.to_chain_params();
    let gateway = ToolGateway::new("gateway");

    if config.providers.builtin.enabled {
        let builtin = builtin_provider().context("Failed to build builtin tools")?;
        gateway
            .add_provider(ChainBuilder::standard(Arc::new(builtin), &params, audit.clone()).build())
            .await
            .context("Failed to add builtin tools")?;
    }

    for bridge in &config.providers.bridges {
        if !BridgeToolProvider::is_available(&bridge.command) {
            warn!(bridge = %bridge.name, command = %bridge.command, "Tool server command not found, skipping");
            continue;
        }
        match BridgeToolProvider::spawn(bridge) {
            Ok(provider) => {
                gateway
                    .add_provider(
                        ChainBuilder::standard(Arc::new(provider), &params, audit.clone()).build(),
                    )
                    .await
                    .with_context(|| format!("Failed to add tool server '{}'", bridge.name))?;
            }
            Err(e) => {
                warn!(bridge = %bridge.name, error = %e, "Failed to start tool server, skipping");
            }
        }
    }

    Ok(gateway)
}
