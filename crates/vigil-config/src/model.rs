// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Vigil plugin registry.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Bytes in one mebibyte.
pub const MIB: u64 = 1024 * 1024;

/// Top-level Vigil configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VigilConfig {
    /// Registry process settings.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Health evaluation thresholds and scheduling.
    #[serde(default)]
    pub health: HealthConfig,

    /// Permission policy.
    #[serde(default)]
    pub permissions: PermissionsConfig,
}

/// Registry process configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Plugin manifest loaded by the CLI when `--manifest` is not given.
    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            manifest_path: default_manifest_path(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_manifest_path() -> String {
    "plugins.toml".to_string()
}

/// Health evaluation configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    /// A plugin whose `last_updated` is older than this many days is stale.
    #[serde(default = "default_stale_after_days")]
    pub stale_after_days: u32,

    /// Memory probe results above this many bytes fail the memory check.
    #[serde(default = "default_max_memory_bytes")]
    pub max_memory_bytes: u64,

    /// Latency probe results above this many milliseconds fail the latency check.
    #[serde(default = "default_max_response_time_ms")]
    pub max_response_time_ms: f64,

    /// Error rate (0.0-1.0) at or above which a plugin is in error.
    #[serde(default = "default_error_rate_threshold")]
    pub error_rate_threshold: f64,

    /// Optional advisory error rate at or above which a plugin is in warning.
    #[serde(default)]
    pub error_rate_warning_threshold: Option<f64>,

    /// How many plugins a single pass evaluates at once.
    #[serde(default = "default_max_concurrent_evaluations")]
    pub max_concurrent_evaluations: usize,

    /// Seconds between passes in `vigil watch`.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            stale_after_days: default_stale_after_days(),
            max_memory_bytes: default_max_memory_bytes(),
            max_response_time_ms: default_max_response_time_ms(),
            error_rate_threshold: default_error_rate_threshold(),
            error_rate_warning_threshold: None,
            max_concurrent_evaluations: default_max_concurrent_evaluations(),
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_stale_after_days() -> u32 {
    90
}

fn default_max_memory_bytes() -> u64 {
    50 * MIB
}

fn default_max_response_time_ms() -> f64 {
    5000.0
}

fn default_error_rate_threshold() -> f64 {
    0.5
}

fn default_max_concurrent_evaluations() -> usize {
    1
}

fn default_interval_secs() -> u64 {
    60
}

/// Permission policy configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionsConfig {
    /// Permissions accepted for every category on top of the built-in allow-lists.
    #[serde(default)]
    pub global: Vec<String>,
}
