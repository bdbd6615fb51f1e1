// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the registry, the evaluator, and the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Closed set of plugin categories.
///
/// The category decides which configuration keys are required, which
/// permissions are allowed, and which semantic checks run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PluginCategory {
    Ai,
    Integration,
    Ui,
    Utility,
    Experimental,
}

/// Health verdict stored on each descriptor.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HealthVerdict {
    /// Every applicable check passed.
    #[default]
    Healthy,
    /// Degraded: at least one warning-level check failed, or a dependency
    /// is not satisfied.
    Warning,
    /// At least one error-level check failed, or evaluation itself failed.
    Error,
    /// The plugin is disabled and excluded from evaluation.
    Disabled,
}

/// Severity of a failing check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl From<Severity> for HealthVerdict {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Warning => HealthVerdict::Warning,
            Severity::Error => HealthVerdict::Error,
        }
    }
}

/// Optional live capability a plugin may expose to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    MemoryUsage,
    AverageResponseTime,
    PerformanceMetrics,
    ValidateConfiguration,
}

/// Individual check run by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    Dependencies,
    ConfigCompleteness,
    CustomConfiguration,
    Permissions,
    CategorySemantics,
    Version,
    Freshness,
    MemoryUsage,
    ResponseLatency,
    ErrorRate,
    /// Evaluation aborted (probe error or panic).
    Evaluation,
}

impl CheckKind {
    /// Severity a failure of this check carries unless the check decides
    /// otherwise (the error-rate check may downgrade to a warning).
    pub fn default_severity(self) -> Severity {
        match self {
            CheckKind::Permissions | CheckKind::ErrorRate | CheckKind::Evaluation => {
                Severity::Error
            }
            CheckKind::Dependencies
            | CheckKind::ConfigCompleteness
            | CheckKind::CustomConfiguration
            | CheckKind::CategorySemantics
            | CheckKind::Version
            | CheckKind::Freshness
            | CheckKind::MemoryUsage
            | CheckKind::ResponseLatency => Severity::Warning,
        }
    }
}

/// A single failing check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    pub check: CheckKind,
    pub severity: Severity,
    pub message: String,
}

impl CheckFailure {
    /// Failure at the check's default severity.
    pub fn new(check: CheckKind, message: impl Into<String>) -> Self {
        Self {
            check,
            severity: check.default_severity(),
            message: message.into(),
        }
    }

    /// Failure with an explicit severity.
    pub fn with_severity(check: CheckKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            check,
            severity,
            message: message.into(),
        }
    }
}

/// Outcome of evaluating one plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub plugin_id: String,
    pub verdict: HealthVerdict,
    pub failures: Vec<CheckFailure>,
    pub evaluated_at: DateTime<Utc>,
}

impl HealthReport {
    /// Fold a list of failures into a report.
    ///
    /// Any error-level failure yields `Error`, otherwise any failure yields
    /// `Warning`, otherwise `Healthy`.
    pub fn from_failures(
        plugin_id: impl Into<String>,
        failures: Vec<CheckFailure>,
        evaluated_at: DateTime<Utc>,
    ) -> Self {
        let verdict = failures
            .iter()
            .map(|f| f.severity)
            .max()
            .map(HealthVerdict::from)
            .unwrap_or(HealthVerdict::Healthy);

        Self {
            plugin_id: plugin_id.into(),
            verdict,
            failures,
            evaluated_at,
        }
    }
}

/// Performance snapshot returned by a plugin's metrics probe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub average_response_time_ms: f64,
    pub memory_usage_bytes: u64,
    pub error_count: u64,
    pub success_count: u64,
    pub last_call_timestamp: Option<DateTime<Utc>>,
}

impl PerformanceMetrics {
    /// Fraction of failed calls, or `None` when no calls were recorded.
    pub fn error_rate(&self) -> Option<f64> {
        let total = self.error_count.saturating_add(self.success_count);
        if total == 0 {
            return None;
        }
        Some(self.error_count as f64 / total as f64)
    }
}

/// Number of stored plugins per verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub healthy: usize,
    pub warning: usize,
    pub error: usize,
    pub disabled: usize,
}

impl HealthSummary {
    /// Count one more plugin with the given verdict.
    pub fn record(&mut self, verdict: HealthVerdict) {
        match verdict {
            HealthVerdict::Healthy => self.healthy += 1,
            HealthVerdict::Warning => self.warning += 1,
            HealthVerdict::Error => self.error += 1,
            HealthVerdict::Disabled => self.disabled += 1,
        }
    }

    pub fn count(&self, verdict: HealthVerdict) -> usize {
        match verdict {
            HealthVerdict::Healthy => self.healthy,
            HealthVerdict::Warning => self.warning,
            HealthVerdict::Error => self.error,
            HealthVerdict::Disabled => self.disabled,
        }
    }

    pub fn total(&self) -> usize {
        self.healthy + self.warning + self.error + self.disabled
    }
}
