// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Health evaluator.
//!
//! Combines the static rules in [`crate::rules`] with a plugin's optional
//! capability probes into a single [`HealthReport`]. The dependency check runs
//! first and short-circuits; the rest of the checks all run and are folded
//! by severity.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, trace};
use vigil_config::{HealthConfig, PermissionsConfig};
use vigil_core::{
    Capability, CheckFailure, CheckKind, HealthReport, HealthVerdict, PerformanceMetrics,
    VigilError,
};

use crate::descriptor::PluginDescriptor;
use crate::rules;

/// What the evaluator needs to know about a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyState {
    pub enabled: bool,
    pub health: HealthVerdict,
}

/// Read access to the current state of other plugins.
pub trait DependencyView: Send + Sync {
    fn dependency_state(&self, id: &str) -> Option<DependencyState>;
}

/// Result of evaluating one plugin.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub report: HealthReport,
    /// Snapshot returned by the metrics probe, if it was queried.
    pub metrics: Option<PerformanceMetrics>,
}

/// Computes verdicts from rules and probes using configured thresholds.
#[derive(Debug, Clone)]
pub struct HealthEvaluator {
    health: HealthConfig,
    global_permissions: Vec<String>,
}

impl HealthEvaluator {
    pub fn new(health: HealthConfig, permissions: PermissionsConfig) -> Self {
        Self {
            health,
            global_permissions: permissions.global,
        }
    }

    pub fn config(&self) -> &HealthConfig {
        &self.health
    }

    /// Evaluate one plugin at time `now`.
    ///
    /// Returns `Err` only when a probe fails or returns malformed data; the
    /// caller turns that into an `Error` verdict.
    pub async fn evaluate(
        &self,
        plugin: &PluginDescriptor,
        dependencies: &dyn DependencyView,
        now: DateTime<Utc>,
    ) -> Result<Evaluation, VigilError> {
        let unsatisfied = unsatisfied_dependencies(plugin, dependencies);
        if !unsatisfied.is_empty() {
            debug!(plugin_id = %plugin.id, ?unsatisfied, "dependencies not satisfied");
            let failure = CheckFailure::new(
                CheckKind::Dependencies,
                format!("unsatisfied dependencies: {}", unsatisfied.join(", ")),
            );
            return Ok(Evaluation {
                report: HealthReport::from_failures(&plugin.id, vec![failure], now),
                metrics: None,
            });
        }

        let caps = &plugin.capabilities;
        let mut failures = Vec::new();

        failures.extend(rules::check_config_completeness(plugin));

        if let Some(validator) = caps.validate_configuration() {
            let valid = validator
                .validate_configuration()
                .await
                .map_err(|e| e.for_plugin(&plugin.id))?;
            if !valid {
                failures.push(CheckFailure::new(
                    CheckKind::CustomConfiguration,
                    "plugin rejected its own configuration",
                ));
            }
        }

        failures.extend(rules::check_permissions(plugin, &self.global_permissions));
        failures.extend(rules::check_category_semantics(plugin));
        failures.extend(rules::check_version(&plugin.version));
        failures.extend(rules::check_freshness(
            plugin.last_updated,
            now,
            Duration::days(i64::from(self.health.stale_after_days)),
        ));

        if let Some(probe) = caps.memory_usage() {
            let bytes = probe
                .memory_usage()
                .await
                .map_err(|e| e.for_plugin(&plugin.id))?;
            failures.extend(rules::check_memory_usage(bytes, self.health.max_memory_bytes));
        }

        if let Some(probe) = caps.average_response_time() {
            let ms = probe
                .average_response_time()
                .await
                .map_err(|e| e.for_plugin(&plugin.id))?;
            if !ms.is_finite() || ms < 0.0 {
                return Err(malformed(plugin, Capability::AverageResponseTime, ms));
            }
            failures.extend(rules::check_response_time(
                ms,
                self.health.max_response_time_ms,
            ));
        }

        let mut metrics = None;
        if let Some(probe) = caps.performance_metrics() {
            let snapshot = probe
                .performance_metrics()
                .await
                .map_err(|e| e.for_plugin(&plugin.id))?;
            let latency = snapshot.average_response_time_ms;
            if !latency.is_finite() || latency < 0.0 {
                return Err(malformed(plugin, Capability::PerformanceMetrics, latency));
            }
            failures.extend(rules::check_error_rate(
                &snapshot,
                self.health.error_rate_threshold,
                self.health.error_rate_warning_threshold,
            ));
            metrics = Some(snapshot);
        }

        for failure in &failures {
            trace!(
                plugin_id = %plugin.id,
                check = %failure.check,
                severity = %failure.severity,
                "{}", failure.message
            );
        }

        Ok(Evaluation {
            report: HealthReport::from_failures(&plugin.id, failures, now),
            metrics,
        })
    }
}

impl Default for HealthEvaluator {
    fn default() -> Self {
        Self::new(HealthConfig::default(), PermissionsConfig::default())
    }
}

/// Dependencies that are missing, disabled, or not healthy, in declaration order.
pub fn unsatisfied_dependencies(
    plugin: &PluginDescriptor,
    view: &dyn DependencyView,
) -> Vec<String> {
    plugin
        .dependencies
        .iter()
        .filter(|dep| {
            !matches!(
                view.dependency_state(dep),
                Some(DependencyState {
                    enabled: true,
                    health: HealthVerdict::Healthy,
                })
            )
        })
        .cloned()
        .collect()
}

fn malformed(plugin: &PluginDescriptor, capability: Capability, value: f64) -> VigilError {
    VigilError::probe(capability, format!("malformed response time {value}")).for_plugin(&plugin.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use serde_json::json;
    use vigil_core::{PluginCategory, Severity};

    use crate::probe::Capabilities;

    #[derive(Default)]
    struct Plugins(HashMap<String, DependencyState>);

    impl Plugins {
        fn with(mut self, id: &str, enabled: bool, health: HealthVerdict) -> Self {
            self.0
                .insert(id.to_string(), DependencyState { enabled, health });
            self
        }
    }

    impl DependencyView for Plugins {
        fn dependency_state(&self, id: &str) -> Option<DependencyState> {
            self.0.get(id).copied()
        }
    }

    fn utility(now: DateTime<Utc>) -> PluginDescriptor {
        PluginDescriptor::new("tool", PluginCategory::Utility, "1.0.0").with_last_updated(now)
    }

    async fn verdict(plugin: &PluginDescriptor, deps: &Plugins) -> HealthVerdict {
        HealthEvaluator::default()
            .evaluate(plugin, deps, Utc::now())
            .await
            .unwrap()
            .report
            .verdict
    }

    #[tokio::test]
    async fn clean_utility_is_healthy() {
        let plugin = utility(Utc::now());
        assert_eq!(verdict(&plugin, &Plugins::default()).await, HealthVerdict::Healthy);
    }

    #[tokio::test]
    async fn ai_without_model_is_warning() {
        let plugin = PluginDescriptor::new("brain", PluginCategory::Ai, "1.0.0")
            .with_last_updated(Utc::now())
            .with_config(json!({"apiEndpoint": "https://api.example.com"}));
        assert_eq!(verdict(&plugin, &Plugins::default()).await, HealthVerdict::Warning);
    }

    #[tokio::test]
    async fn unsatisfied_dependency_short_circuits() {
        let plugin = utility(Utc::now())
            .with_dependencies(["base"])
            .with_capabilities(Capabilities::new().memory_usage_fn(|| {
                panic!("probes must not run when dependencies are unsatisfied")
            }));

        for deps in [
            Plugins::default(),
            Plugins::default().with("base", false, HealthVerdict::Healthy),
            Plugins::default().with("base", true, HealthVerdict::Warning),
            Plugins::default().with("base", true, HealthVerdict::Error),
        ] {
            let evaluation = HealthEvaluator::default()
                .evaluate(&plugin, &deps, Utc::now())
                .await
                .unwrap();
            assert_eq!(evaluation.report.verdict, HealthVerdict::Warning);
            assert_eq!(evaluation.report.failures.len(), 1);
            assert_eq!(evaluation.report.failures[0].check, CheckKind::Dependencies);
            assert!(evaluation.metrics.is_none());
        }
    }

    #[tokio::test]
    async fn dependency_short_circuit_hides_errors() {
        // The permission error would otherwise make this plugin `error`.
        let plugin = utility(Utc::now())
            .with_permissions(["bogus"])
            .with_dependencies(["base"]);
        assert_eq!(verdict(&plugin, &Plugins::default()).await, HealthVerdict::Warning);
    }

    #[tokio::test]
    async fn satisfied_dependency_runs_full_checks() {
        let plugin = utility(Utc::now()).with_dependencies(["base"]);
        let deps = Plugins::default().with("base", true, HealthVerdict::Healthy);
        assert_eq!(verdict(&plugin, &deps).await, HealthVerdict::Healthy);
    }

    #[tokio::test]
    async fn memory_over_limit_is_warning() {
        let plugin = utility(Utc::now())
            .with_capabilities(Capabilities::new().memory_usage_fn(|| Ok(50 * 1024 * 1024 + 1)));
        assert_eq!(verdict(&plugin, &Plugins::default()).await, HealthVerdict::Warning);
    }

    #[tokio::test]
    async fn slow_plugin_is_warning() {
        let plugin = utility(Utc::now())
            .with_capabilities(Capabilities::new().average_response_time_fn(|| Ok(7500.0)));
        assert_eq!(verdict(&plugin, &Plugins::default()).await, HealthVerdict::Warning);
    }

    #[tokio::test]
    async fn config_validator_rejection_is_warning() {
        let plugin = utility(Utc::now())
            .with_capabilities(Capabilities::new().validate_configuration_fn(|| Ok(false)));
        assert_eq!(verdict(&plugin, &Plugins::default()).await, HealthVerdict::Warning);
    }

    #[tokio::test]
    async fn high_error_rate_is_error_and_returns_snapshot() {
        let plugin = utility(Utc::now()).with_capabilities(
            Capabilities::new().performance_metrics_fn(|| {
                Ok(PerformanceMetrics {
                    error_count: 6,
                    success_count: 4,
                    ..Default::default()
                })
            }),
        );
        let evaluation = HealthEvaluator::default()
            .evaluate(&plugin, &Plugins::default(), Utc::now())
            .await
            .unwrap();
        assert_eq!(evaluation.report.verdict, HealthVerdict::Error);
        assert_eq!(evaluation.report.failures[0].severity, Severity::Error);
        assert_eq!(evaluation.metrics.unwrap().error_count, 6);
    }

    #[tokio::test]
    async fn probe_error_is_tagged_with_plugin() {
        let plugin = utility(Utc::now()).with_capabilities(Capabilities::new().memory_usage_fn(
            || Err(VigilError::probe(Capability::MemoryUsage, "unavailable")),
        ));
        let err = HealthEvaluator::default()
            .evaluate(&plugin, &Plugins::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VigilError::Probe { ref plugin_id, capability: Capability::MemoryUsage, .. }
                if plugin_id == "tool"
        ));
    }

    #[tokio::test]
    async fn nan_latency_is_malformed() {
        let plugin = utility(Utc::now())
            .with_capabilities(Capabilities::new().average_response_time_fn(|| Ok(f64::NAN)));
        let result = HealthEvaluator::default()
            .evaluate(&plugin, &Plugins::default(), Utc::now())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn all_failures_are_collected() {
        let plugin = PluginDescriptor::new("ui", PluginCategory::Ui, "0.1.0")
            .with_config(json!({"theme": "neon"}))
            .with_permissions(["bogus"]);
        let report = HealthEvaluator::default()
            .evaluate(&plugin, &Plugins::default(), Utc::now())
            .await
            .unwrap()
            .report;
        let checks: Vec<CheckKind> = report.failures.iter().map(|f| f.check).collect();
        assert_eq!(
            checks,
            vec![
                CheckKind::ConfigCompleteness,
                CheckKind::Permissions,
                CheckKind::CategorySemantics,
                CheckKind::Version,
                CheckKind::Freshness,
            ]
        );
        assert_eq!(report.verdict, HealthVerdict::Error);
    }

    #[tokio::test]
    async fn custom_thresholds_apply() {
        let health = HealthConfig {
            max_memory_bytes: 1024,
            error_rate_warning_threshold: Some(0.1),
            ..HealthConfig::default()
        };
        let evaluator = HealthEvaluator::new(
            health,
            PermissionsConfig {
                global: vec!["telemetry".to_string()],
            },
        );
        let plugin = utility(Utc::now())
            .with_permissions(["telemetry"])
            .with_capabilities(Capabilities::new().performance_metrics_fn(|| {
                Ok(PerformanceMetrics {
                    error_count: 1,
                    success_count: 4,
                    ..Default::default()
                })
            }));
        let report = evaluator
            .evaluate(&plugin, &Plugins::default(), Utc::now())
            .await
            .unwrap()
            .report;
        assert_eq!(report.verdict, HealthVerdict::Warning);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].check, CheckKind::ErrorRate);
    }
}
