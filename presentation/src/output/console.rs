//! Console output formatter for gateway results

use colored::Colorize;
use gateway_application::{
    Catalog, ChainStats, GatewayStats, InvokeToolOutput, MetricsSnapshot,
};
use gateway_domain::{CircuitState, ProviderError, ToolDescriptor, util::preview};
use serde::Serialize;

/// Characters of tool output shown per attempt when a call is repeated
const REPEAT_PREVIEW_CHARS: usize = 80;

/// Formats gateway results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Catalog table plus any name conflicts
    pub fn format_catalog(catalog: &Catalog) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!("Tools ({})", catalog.tools.len())));
        output.push('\n');

        if catalog.tools.is_empty() {
            output.push_str(&format!("\n  {}\n", "No tools available".dimmed()));
        } else {
            let width = catalog
                .tools
                .iter()
                .map(|t| t.name.len())
                .max()
                .unwrap_or(0);
            output.push('\n');
            for tool in &catalog.tools {
                output.push_str(&format!(
                    "  {}  {}\n",
                    format!("{:<width$}", tool.name).green().bold(),
                    tool.description
                ));
            }
        }

        if !catalog.conflicts.is_empty() {
            output.push_str(&Self::section_header("Conflicts"));
            for conflict in &catalog.conflicts {
                output.push_str(&format!(
                    "  * {} served by {}, hidden in {}\n",
                    conflict.tool.yellow(),
                    conflict.owner,
                    conflict.shadowed.dimmed()
                ));
            }
        }

        output
    }

    /// Pretty JSON for any serializable result
    pub fn format_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Result of one `call`: the final output, plus a line per attempt when repeated
    pub fn format_invocation(output: &InvokeToolOutput) -> String {
        let mut text = String::new();

        if output.attempts.len() > 1 {
            for (i, attempt) in output.attempts.iter().enumerate() {
                let status = match &attempt.result {
                    Ok(out) => format!("{} {}", "ok".green(), preview(out, REPEAT_PREVIEW_CHARS)),
                    Err(e) => format!("{} {}", "error".red(), e),
                };
                text.push_str(&format!(
                    "{} {:>8} {}\n",
                    format!("#{}", i + 1).dimmed(),
                    Self::duration(attempt.duration.as_secs_f64()),
                    status
                ));
            }
            text.push_str(&format!(
                "{} {}/{} succeeded\n\n",
                "Summary:".cyan().bold(),
                output.succeeded(),
                output.attempts.len()
            ));
        }

        match output.last() {
            Some(Ok(out)) => {
                text.push_str(out);
                text.push('\n');
            }
            Some(Err(e)) => text.push_str(&Self::error(e)),
            None => {}
        }

        text
    }

    /// Rendered provider error, one line
    pub fn error(error: &ProviderError) -> String {
        format!("{} {}\n", "Error:".red().bold(), error)
    }

    pub fn warning(message: &str) -> String {
        format!("{} {}\n", "Warning:".yellow().bold(), message)
    }

    /// Outcome of a requirement check
    pub fn format_validation(result: &Result<Vec<ToolDescriptor>, ProviderError>) -> String {
        match result {
            Ok(tools) => {
                let mut output = format!(
                    "{} all {} required tools are available\n",
                    "OK".green().bold(),
                    tools.len()
                );
                for tool in tools {
                    output.push_str(&format!("  {} {}\n", "✓".green(), tool.name));
                }
                output
            }
            Err(e) => match e.missing_tools() {
                Some(missing) => {
                    let mut output = format!(
                        "{} {} required tools are missing\n",
                        "FAILED".red().bold(),
                        missing.len()
                    );
                    for name in missing {
                        output.push_str(&format!("  {} {}\n", "✗".red(), name));
                    }
                    output
                }
                None => Self::error(e),
            },
        }
    }

    /// Per-provider statistics
    pub fn format_stats(stats: &GatewayStats) -> String {
        let mut output = String::new();

        output.push_str(&Self::section_header("Gateway"));
        output.push_str(&format!(
            "  providers: {}  tools: {}  conflicts: {}\n",
            stats.aggregator.total_providers, stats.aggregator.total_tools, stats.aggregator.conflicts
        ));

        for chain in &stats.providers {
            output.push_str(&Self::format_chain(chain));
        }

        output
    }

    fn format_chain(chain: &ChainStats) -> String {
        let mut output = Self::section_header(&chain.provider);

        let layers = if chain.layers.is_empty() {
            "none".to_string()
        } else {
            chain.layers.join(" -> ")
        };
        output.push_str(&format!("  {} {}\n", "layers:".dimmed(), layers));

        if let Some(metrics) = &chain.metrics {
            output.push_str(&Self::format_metrics(metrics));
        }

        if let Some(cache) = &chain.cache {
            output.push_str(&format!(
                "  {} {} entries ({} active, {} expired)\n",
                "cache:".dimmed(),
                cache.total,
                cache.active,
                cache.expired
            ));
        }

        if let Some(circuit) = &chain.circuit {
            let state = circuit.state.to_string();
            let state = match circuit.state {
                CircuitState::Closed => state.green(),
                CircuitState::HalfOpen => state.yellow(),
                CircuitState::Open => state.red(),
            };
            output.push_str(&format!(
                "  {} {} (failures: {}, successes: {})\n",
                "circuit:".dimmed(),
                state.bold(),
                circuit.failure_count,
                circuit.success_count
            ));
        }

        output
    }

    fn format_metrics(metrics: &MetricsSnapshot) -> String {
        let mut output = format!(
            "  {} {} executions, {} errors ({:.1}%)\n",
            "metrics:".dimmed(),
            metrics.total_executions,
            metrics.total_errors,
            metrics.error_rate() * 100.0
        );

        let mut tools: Vec<_> = metrics.execution_counts.iter().collect();
        tools.sort_by(|a, b| a.0.cmp(b.0));
        for (tool, count) in tools {
            let errors = metrics.error_counts.get(tool).copied().unwrap_or(0);
            let avg = metrics
                .average_time(tool)
                .map(|d| Self::duration(d.as_secs_f64()))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "    {:<20} calls: {:<5} errors: {:<5} avg: {}\n",
                tool, count, errors, avg
            ));
        }

        output
    }

    fn duration(secs: f64) -> String {
        if secs < 1.0 {
            format!("{:.1}ms", secs * 1000.0)
        } else {
            format!("{:.2}s", secs)
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }
}
