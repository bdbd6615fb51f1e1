// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vigil watch` command implementation.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;
use vigil_config::VigilConfig;
use vigil_core::VigilError;
use vigil_registry::PluginRegistry;

/// Run health-check passes every `health.interval_secs` until Ctrl-C.
///
/// Verdict transitions are logged by the registry as they happen.
pub async fn run_watch(config: &VigilConfig, manifest: Option<PathBuf>) -> Result<(), VigilError> {
    let registry = crate::load_registry(config, manifest.as_deref())?;
    let period = Duration::from_secs(config.health.interval_secs.max(1));
    info!(interval_secs = period.as_secs(), "watching plugin health");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };
    let passes = watch_loop(&registry, period, None);
    tokio::select! {
        _ = shutdown => info!("shutdown requested"),
        count = passes => info!(passes = count, "watch loop ended"),
    }
    Ok(())
}

/// Run passes every `period`, stopping after `limit` passes when given.
///
/// Returns the number of passes run.
pub async fn watch_loop(registry: &PluginRegistry, period: Duration, limit: Option<usize>) -> usize {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut passes = 0;

    while limit.is_none_or(|max| passes < max) {
        ticker.tick().await;
        let reports = registry.run_health_check().await;
        passes += 1;
        tracing::debug!(pass = passes, evaluated = reports.len(), "pass finished");
    }
    passes
}
