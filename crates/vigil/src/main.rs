// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vigil - plugin registry health checker.
//!
//! This is the binary entry point. It loads configuration, reads the plugin
//! manifest and runs health-check passes over the registered plugins.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod watch;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use vigil_config::VigilConfig;
use vigil_core::VigilError;
use vigil_registry::PluginRegistry;

/// Vigil - plugin registry health checker.
#[derive(Parser, Debug)]
#[command(name = "vigil", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one health-check pass and print the verdicts.
    Check {
        /// Plugin manifest (defaults to `registry.manifest_path`).
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Print reports as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
        /// Append Prometheus metrics after the table.
        #[arg(long)]
        metrics: bool,
    },
    /// Run health-check passes periodically until interrupted.
    Watch {
        /// Plugin manifest (defaults to `registry.manifest_path`).
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match vigil_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            vigil_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.registry.log_level);

    let result = match cli.command {
        Some(Commands::Check {
            manifest,
            json,
            plain,
            metrics,
        }) => {
            let options = check::CheckOptions {
                manifest,
                json,
                plain,
                metrics,
            };
            check::run_check(&config, options).await.map(|any_error| {
                if any_error {
                    std::process::exit(1);
                }
            })
        }
        Some(Commands::Watch { manifest }) => watch::run_watch(&config, manifest).await,
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("vigil: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn print_config(config: &VigilConfig) -> Result<(), VigilError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| VigilError::Config(format!("failed to render configuration: {e}")))?;
    print!("{rendered}");
    Ok(())
}

/// Build a registry from `config` and register every plugin in the manifest.
pub(crate) fn load_registry(
    config: &VigilConfig,
    manifest: Option<&Path>,
) -> Result<PluginRegistry, VigilError> {
    let path = manifest.unwrap_or_else(|| Path::new(&config.registry.manifest_path));
    let registry = PluginRegistry::from_config(config);
    for plugin in vigil_registry::load_plugin_manifest(path)? {
        registry.register_plugin(plugin)?;
    }
    tracing::info!(manifest = %path.display(), plugins = registry.len(), "registry loaded");
    Ok(registry)
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vigil={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
