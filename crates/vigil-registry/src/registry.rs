// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry.
//!
//! The `PluginRegistry` stores descriptors keyed by plugin id together with the
//! latest metrics snapshot and health report for each plugin. All collections
//! are concurrent maps, so registration and health-check passes can overlap.

use std::panic::AssertUnwindSafe;
use std::time::Instant;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::{FutureExt, StreamExt, stream};
use tracing::{debug, error, info, warn};
use vigil_config::VigilConfig;
use vigil_core::{
    CheckFailure, CheckKind, HealthReport, HealthSummary, HealthVerdict, PerformanceMetrics,
    VigilError,
};

use crate::descriptor::PluginDescriptor;
use crate::evaluator::{DependencyState, DependencyView, HealthEvaluator};
use crate::recording;

/// Registry of plugins and their health.
///
/// Construct one per host and share it by reference (or `Arc`).
pub struct PluginRegistry {
    plugins: DashMap<String, PluginDescriptor>,
    metrics: DashMap<String, PerformanceMetrics>,
    reports: DashMap<String, HealthReport>,
    evaluator: HealthEvaluator,
    concurrency: usize,
}

impl PluginRegistry {
    /// Create an empty registry with default thresholds.
    pub fn new() -> Self {
        Self::with_evaluator(HealthEvaluator::default())
    }

    /// Create an empty registry using the thresholds in `config`.
    pub fn from_config(config: &VigilConfig) -> Self {
        Self::with_evaluator(HealthEvaluator::new(
            config.health.clone(),
            config.permissions.clone(),
        ))
    }

    pub fn with_evaluator(evaluator: HealthEvaluator) -> Self {
        let concurrency = evaluator.config().max_concurrent_evaluations.max(1);
        Self {
            plugins: DashMap::new(),
            metrics: DashMap::new(),
            reports: DashMap::new(),
            evaluator,
            concurrency,
        }
    }

    /// Insert or replace a plugin.
    ///
    /// A missing `health` defaults to `Healthy` and a missing `last_updated`
    /// to now. Re-registering an id replaces the stored descriptor; its
    /// metrics snapshot is kept.
    pub fn register_plugin(&self, mut descriptor: PluginDescriptor) -> Result<(), VigilError> {
        if descriptor.id.trim().is_empty() {
            return Err(VigilError::InvalidRegistration {
                reason: "plugin id must not be empty".to_string(),
            });
        }

        descriptor.health.get_or_insert(HealthVerdict::Healthy);
        descriptor.last_updated.get_or_insert_with(Utc::now);

        let id = descriptor.id.clone();
        let category = descriptor.category;
        let enabled = descriptor.enabled;
        let replaced = self.plugins.insert(id.clone(), descriptor).is_some();
        info!(plugin_id = %id, %category, enabled, replaced, "plugin registered");
        Ok(())
    }

    /// Remove a plugin along with its metrics and report.
    pub fn unregister_plugin(&self, id: &str) -> Option<PluginDescriptor> {
        let removed = self.plugins.remove(id).map(|(_, descriptor)| descriptor);
        self.metrics.remove(id);
        self.reports.remove(id);
        if removed.is_some() {
            info!(plugin_id = %id, "plugin unregistered");
        }
        removed
    }

    pub fn get_plugin(&self, id: &str) -> Option<PluginDescriptor> {
        self.plugins.get(id).map(|entry| entry.value().clone())
    }

    /// Snapshot of every stored plugin, sorted by id.
    pub fn get_all_plugins(&self) -> Vec<PluginDescriptor> {
        let mut plugins: Vec<PluginDescriptor> =
            self.plugins.iter().map(|entry| entry.value().clone()).collect();
        plugins.sort_by(|a, b| a.id.cmp(&b.id));
        plugins
    }

    /// Last snapshot captured by the plugin's metrics probe.
    pub fn get_performance_metrics(&self, id: &str) -> Option<PerformanceMetrics> {
        self.metrics.get(id).map(|entry| entry.value().clone())
    }

    /// Report from the plugin's most recent evaluation.
    pub fn get_health_report(&self, id: &str) -> Option<HealthReport> {
        self.reports.get(id).map(|entry| entry.value().clone())
    }

    /// Count of stored plugins per verdict.
    pub fn summary(&self) -> HealthSummary {
        let mut summary = HealthSummary::default();
        for entry in self.plugins.iter() {
            summary.record(entry.value().health());
        }
        summary
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Run one health-check pass now.
    pub async fn run_health_check(&self) -> Vec<HealthReport> {
        self.run_health_check_at(Utc::now()).await
    }

    /// Run one health-check pass as of `now`.
    ///
    /// Every enabled plugin is evaluated and its verdict written back.
    /// Disabled plugins are left untouched. A failing or panicking probe only
    /// affects its own plugin. Returns the reports of this pass, sorted by id.
    pub async fn run_health_check_at(&self, now: DateTime<Utc>) -> Vec<HealthReport> {
        let started = Instant::now();
        let mut ids: Vec<String> = self
            .plugins
            .iter()
            .filter(|entry| entry.value().enabled)
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        debug!(plugins = ids.len(), concurrency = self.concurrency, "health check pass started");

        let mut reports: Vec<HealthReport> = stream::iter(ids)
            .map(|id| self.check_plugin(id, now))
            .buffer_unordered(self.concurrency)
            .filter_map(|report| async move { report })
            .collect()
            .await;
        reports.sort_by(|a, b| a.plugin_id.cmp(&b.plugin_id));

        let summary = self.summary();
        recording::record_pass(started.elapsed(), &summary);
        info!(
            evaluated = reports.len(),
            healthy = summary.healthy,
            warning = summary.warning,
            error = summary.error,
            disabled = summary.disabled,
            "health check pass complete"
        );
        reports
    }

    /// Evaluate one plugin and write back its verdict.
    ///
    /// Returns `None` when the plugin vanished or was disabled before its
    /// verdict could be stored.
    async fn check_plugin(&self, id: String, now: DateTime<Utc>) -> Option<HealthReport> {
        let plugin = {
            let entry = self.plugins.get(&id)?;
            if !entry.enabled {
                return None;
            }
            entry.value().clone()
        };

        let outcome = AssertUnwindSafe(self.evaluator.evaluate(&plugin, self, now))
            .catch_unwind()
            .await;

        let (report, metrics) = match outcome {
            Ok(Ok(evaluation)) => (evaluation.report, evaluation.metrics),
            Ok(Err(err)) => {
                warn!(plugin_id = %id, error = %err, "plugin evaluation failed");
                if let VigilError::Probe { capability, .. } = &err {
                    recording::record_probe_failure(*capability);
                }
                (evaluation_failed(&id, err.to_string(), now), None)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(plugin_id = %id, panic = %message, "plugin evaluation panicked");
                recording::record_evaluation_panic();
                (
                    evaluation_failed(&id, format!("evaluation panicked: {message}"), now),
                    None,
                )
            }
        };

        let previous = {
            let mut entry = match self.plugins.get_mut(&id) {
                Some(entry) if entry.enabled => entry,
                _ => {
                    debug!(plugin_id = %id, "plugin removed or disabled mid-pass, verdict dropped");
                    return None;
                }
            };
            entry.health.replace(report.verdict)
        };

        if previous != Some(report.verdict) {
            info!(
                plugin_id = %id,
                from = %previous.unwrap_or_default(),
                to = %report.verdict,
                "plugin health changed"
            );
        }

        if let Some(snapshot) = metrics {
            self.metrics.insert(id.clone(), snapshot);
        }
        self.reports.insert(id, report.clone());
        recording::record_evaluation(report.verdict);
        Some(report)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyView for PluginRegistry {
    fn dependency_state(&self, id: &str) -> Option<DependencyState> {
        self.plugins.get(id).map(|entry| DependencyState {
            enabled: entry.enabled,
            health: entry.health(),
        })
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins.len())
            .field("metrics", &self.metrics.len())
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

fn evaluation_failed(id: &str, message: String, now: DateTime<Utc>) -> HealthReport {
    HealthReport::from_failures(
        id,
        vec![CheckFailure::new(CheckKind::Evaluation, message)],
        now,
    )
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
