// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vigil check` command implementation.
//!
//! Loads the plugin manifest, runs a single health-check pass and prints one
//! line per plugin, or a JSON document with `--json`.

use std::io::IsTerminal;
use std::path::PathBuf;

use serde::Serialize;
use vigil_config::VigilConfig;
use vigil_core::{
    CheckFailure, HealthSummary, HealthVerdict, PerformanceMetrics, PluginCategory, VigilError,
};
use vigil_registry::PluginRegistry;

/// Flags of `vigil check`.
#[derive(Debug, Default)]
pub struct CheckOptions {
    pub manifest: Option<PathBuf>,
    pub json: bool,
    pub plain: bool,
    pub metrics: bool,
}

/// Structured output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub summary: HealthSummary,
    pub plugins: Vec<PluginStatus>,
}

/// One plugin in `--json` output.
#[derive(Debug, Serialize)]
pub struct PluginStatus {
    pub id: String,
    pub name: String,
    pub category: PluginCategory,
    pub version: String,
    pub enabled: bool,
    pub verdict: HealthVerdict,
    pub failures: Vec<CheckFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<PerformanceMetrics>,
}

/// Run the `vigil check` command.
///
/// Returns `true` when at least one plugin ended the pass in `error`.
pub async fn run_check(config: &VigilConfig, options: CheckOptions) -> Result<bool, VigilError> {
    #[cfg(feature = "prometheus")]
    let exporter = if options.metrics {
        Some(vigil_prometheus::PrometheusExporter::install()?)
    } else {
        None
    };
    #[cfg(not(feature = "prometheus"))]
    if options.metrics {
        tracing::warn!("built without the prometheus feature, --metrics ignored");
    }

    let registry = crate::load_registry(config, options.manifest.as_deref())?;
    registry.run_health_check().await;
    let output = collect(&registry);

    if options.json {
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| VigilError::Internal(format!("failed to serialize report: {e}")))?;
        println!("{json}");
    } else {
        let use_color = !options.plain && std::io::stdout().is_terminal();
        print_table(&output, use_color);
    }

    #[cfg(feature = "prometheus")]
    if let Some(exporter) = exporter {
        print!("{}", exporter.render());
    }

    Ok(output.summary.error > 0)
}

/// Gather every stored plugin with its latest report and metrics.
pub fn collect(registry: &PluginRegistry) -> CheckOutput {
    let plugins = registry
        .get_all_plugins()
        .into_iter()
        .map(|plugin| {
            let failures = registry
                .get_health_report(&plugin.id)
                .map(|report| report.failures)
                .unwrap_or_default();
            PluginStatus {
                metrics: registry.get_performance_metrics(&plugin.id),
                verdict: plugin.health(),
                id: plugin.id,
                name: plugin.name,
                category: plugin.category,
                version: plugin.version,
                enabled: plugin.enabled,
                failures,
            }
        })
        .collect();

    CheckOutput {
        summary: registry.summary(),
        plugins,
    }
}

fn print_table(output: &CheckOutput, use_color: bool) {
    println!();
    println!("  vigil check");
    println!("  {}", "-".repeat(50));

    for plugin in &output.plugins {
        println!("{}", format_plugin_line(plugin, use_color));
        for failure in &plugin.failures {
            println!("{}", format_failure_line(failure, use_color));
        }
    }

    println!();
    let summary = &output.summary;
    println!(
        "  {} plugins: {} healthy, {} warning, {} error, {} disabled",
        summary.total(),
        summary.healthy,
        summary.warning,
        summary.error,
        summary.disabled
    );
    println!();
}

/// One status line per plugin.
pub fn format_plugin_line(plugin: &PluginStatus, use_color: bool) -> String {
    let label = format!("{} ({} {})", plugin.id, plugin.category, plugin.version);
    if !use_color {
        let tag = match plugin.verdict {
            HealthVerdict::Healthy => "[OK]  ",
            HealthVerdict::Warning => "[WARN]",
            HealthVerdict::Error => "[FAIL]",
            HealthVerdict::Disabled => "[OFF] ",
        };
        return format!("    {tag} {label:<32} {}", plugin.verdict);
    }

    use colored::Colorize;
    let verdict = plugin.verdict.to_string();
    match plugin.verdict {
        HealthVerdict::Healthy => format!("    {} {label:<32} {}", "✓".green(), verdict.green()),
        HealthVerdict::Warning => {
            format!("    {} {label:<32} {}", "!".yellow(), verdict.yellow())
        }
        HealthVerdict::Error => format!("    {} {label:<32} {}", "✗".red(), verdict.red()),
        HealthVerdict::Disabled => {
            format!("    {} {label:<32} {}", "-".dimmed(), verdict.dimmed())
        }
    }
}

fn format_failure_line(failure: &CheckFailure, use_color: bool) -> String {
    let text = format!("{}: {}", failure.check, failure.message);
    if use_color {
        use colored::Colorize;
        format!("           {}", text.dimmed())
    } else {
        format!("           {text}")
    }
}
