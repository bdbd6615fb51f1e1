// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static validation rules.
//!
//! Every rule is a pure function of the descriptor (and, where needed, the
//! evaluation time or a threshold). A rule returns `Some(CheckFailure)` when it
//! fails and `None` when it passes or has nothing to check.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde_json::Value;
use strum::IntoEnumIterator;
use vigil_core::{CheckFailure, CheckKind, PerformanceMetrics, PluginCategory, Severity};

use crate::descriptor::PluginDescriptor;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+(?:-[0-9A-Za-z][0-9A-Za-z.-]*)?$")
        .expect("version pattern is a valid regex")
});

/// Themes a UI plugin may select.
pub const UI_THEMES: [&str; 3] = ["light", "dark", "auto"];

/// Configuration keys a category requires.
pub fn required_config_keys(category: PluginCategory) -> &'static [&'static str] {
    match category {
        PluginCategory::Ai => &["model", "apiEndpoint"],
        PluginCategory::Integration => &["endpoint", "apiKey"],
        PluginCategory::Ui => &["theme", "layout"],
        PluginCategory::Utility | PluginCategory::Experimental => &[],
    }
}

/// Permissions a category may request.
pub fn allowed_permissions(category: PluginCategory) -> &'static [&'static str] {
    match category {
        PluginCategory::Ai => &[
            "ai-access",
            "model-switching",
            "data-analysis",
            "pattern-recognition",
            "emotion-analysis",
            "personality-adaptation",
        ],
        PluginCategory::Ui => &["theme-control", "ui-rendering", "user-interaction"],
        PluginCategory::Integration => &["api-access", "external-services", "network-access"],
        PluginCategory::Utility => &["system-access", "background-processing", "file-access"],
        PluginCategory::Experimental => &["experimental-features", "beta-access"],
    }
}

/// True when `permission` is in any category's allow-list.
pub fn is_known_permission(permission: &str) -> bool {
    PluginCategory::iter().any(|c| allowed_permissions(c).contains(&permission))
}

/// Category-required keys must be present. Skipped when there is no config.
pub fn check_config_completeness(plugin: &PluginDescriptor) -> Option<CheckFailure> {
    let config = plugin.config.as_ref()?;
    let missing: Vec<&str> = required_config_keys(plugin.category)
        .iter()
        .copied()
        .filter(|key| !config.contains_key(*key))
        .collect();

    if missing.is_empty() {
        return None;
    }
    Some(CheckFailure::new(
        CheckKind::ConfigCompleteness,
        format!(
            "{} plugin is missing required config: {}",
            plugin.category,
            missing.join(", ")
        ),
    ))
}

/// Every permission must be allowed for the category, allowed for some other
/// category, or listed in `global`. Skipped when no permission is requested.
pub fn check_permissions(plugin: &PluginDescriptor, global: &[String]) -> Option<CheckFailure> {
    let category_allowed = allowed_permissions(plugin.category);
    let denied: Vec<&str> = plugin
        .permissions
        .iter()
        .map(String::as_str)
        .filter(|p| {
            !category_allowed.contains(p)
                && !is_known_permission(p)
                && !global.iter().any(|g| g.as_str() == *p)
        })
        .collect();

    if denied.is_empty() {
        return None;
    }
    Some(CheckFailure::new(
        CheckKind::Permissions,
        format!("unrecognized permissions: {}", denied.join(", ")),
    ))
}

/// Per-category semantic checks on config values that are present.
pub fn check_category_semantics(plugin: &PluginDescriptor) -> Option<CheckFailure> {
    let mut problems = Vec::new();

    match plugin.category {
        PluginCategory::Ai => {
            if let Some(model) = plugin.config_value("model")
                && !model.is_string()
            {
                problems.push("config.model must be a string".to_string());
            }
            if let Some(endpoint) = plugin.config_value("apiEndpoint")
                && !is_valid_url(endpoint)
            {
                problems.push(format!("config.apiEndpoint is not a valid URL: {endpoint}"));
            }
        }
        PluginCategory::Integration => {
            if let Some(endpoint) = plugin.config_value("endpoint")
                && !is_valid_url(endpoint)
            {
                problems.push(format!("config.endpoint is not a valid URL: {endpoint}"));
            }
            if let Some(key) = plugin.config_value("apiKey")
                && !key.is_string()
            {
                problems.push("config.apiKey must be a string".to_string());
            }
        }
        PluginCategory::Ui => {
            if let Some(theme) = plugin.config_value("theme")
                && !theme.as_str().is_some_and(|t| UI_THEMES.contains(&t))
            {
                problems.push(format!(
                    "config.theme must be one of {}, got {theme}",
                    UI_THEMES.join(", ")
                ));
            }
        }
        // Utilities and experimental plugins are not semantically checked.
        PluginCategory::Utility | PluginCategory::Experimental => {}
    }

    if problems.is_empty() {
        return None;
    }
    Some(CheckFailure::new(
        CheckKind::CategorySemantics,
        problems.join("; "),
    ))
}

fn is_valid_url(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| url::Url::parse(s).is_ok())
}

/// The version must be `MAJOR.MINOR.PATCH[-prerelease]` with a non-zero major.
pub fn check_version(version: &str) -> Option<CheckFailure> {
    let parsed = VERSION_PATTERN
        .is_match(version)
        .then(|| semver::Version::parse(version).ok())
        .flatten();

    match parsed {
        None => Some(CheckFailure::new(
            CheckKind::Version,
            format!("`{version}` is not a semantic version (MAJOR.MINOR.PATCH[-prerelease])"),
        )),
        Some(v) if v.major == 0 => Some(CheckFailure::new(
            CheckKind::Version,
            format!("`{version}` is a pre-1.0 release"),
        )),
        Some(_) => None,
    }
}

/// Fails when `last_updated` is absent or older than `stale_after`.
pub fn check_freshness(
    last_updated: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    stale_after: Duration,
) -> Option<CheckFailure> {
    let Some(updated) = last_updated else {
        return Some(CheckFailure::new(
            CheckKind::Freshness,
            "plugin has never reported an update",
        ));
    };

    let age = now.signed_duration_since(updated);
    if age > stale_after {
        return Some(CheckFailure::new(
            CheckKind::Freshness,
            format!(
                "last updated {} days ago (limit {} days)",
                age.num_days(),
                stale_after.num_days()
            ),
        ));
    }
    None
}

/// Fails when memory use exceeds `limit_bytes`.
pub fn check_memory_usage(bytes: u64, limit_bytes: u64) -> Option<CheckFailure> {
    (bytes > limit_bytes).then(|| {
        CheckFailure::new(
            CheckKind::MemoryUsage,
            format!("memory usage {bytes} bytes exceeds limit of {limit_bytes} bytes"),
        )
    })
}

/// Fails when average latency exceeds `limit_ms`.
pub fn check_response_time(average_ms: f64, limit_ms: f64) -> Option<CheckFailure> {
    (average_ms > limit_ms).then(|| {
        CheckFailure::new(
            CheckKind::ResponseLatency,
            format!("average response time {average_ms:.0}ms exceeds limit of {limit_ms:.0}ms"),
        )
    })
}

/// Error-rate check.
///
/// `rate >= error_threshold` is an error. Below that, `rate >= warning_threshold`
/// (when configured) is a warning. No recorded calls means nothing to check.
pub fn check_error_rate(
    metrics: &PerformanceMetrics,
    error_threshold: f64,
    warning_threshold: Option<f64>,
) -> Option<CheckFailure> {
    let rate = metrics.error_rate()?;
    let describe = |limit: f64| {
        format!(
            "error rate {:.1}% ({} of {} calls) at or above {:.1}%",
            rate * 100.0,
            metrics.error_count,
            metrics.error_count.saturating_add(metrics.success_count),
            limit * 100.0
        )
    };

    if rate >= error_threshold {
        return Some(CheckFailure::with_severity(
            CheckKind::ErrorRate,
            Severity::Error,
            describe(error_threshold),
        ));
    }
    match warning_threshold {
        Some(limit) if rate >= limit => Some(CheckFailure::with_severity(
            CheckKind::ErrorRate,
            Severity::Warning,
            describe(limit),
        )),
        _ => None,
    }
}
