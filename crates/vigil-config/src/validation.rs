// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as rate thresholds inside `0.0..=1.0` and non-zero concurrency.

use crate::diagnostic::ConfigError;
use crate::model::VigilConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of failing fast.
pub fn validate_config(config: &VigilConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let health = &config.health;

    if !LOG_LEVELS.contains(&config.registry.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "registry.log_level `{}` must be one of: {}",
                config.registry.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.registry.manifest_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "registry.manifest_path must not be empty".to_string(),
        });
    }

    if health.stale_after_days == 0 {
        errors.push(ConfigError::Validation {
            message: "health.stale_after_days must be at least 1".to_string(),
        });
    }

    if !(health.max_response_time_ms.is_finite() && health.max_response_time_ms > 0.0) {
        errors.push(ConfigError::Validation {
            message: format!(
                "health.max_response_time_ms must be a positive number, got {}",
                health.max_response_time_ms
            ),
        });
    }

    if !(0.0..=1.0).contains(&health.error_rate_threshold) {
        errors.push(ConfigError::Validation {
            message: format!(
                "health.error_rate_threshold must be between 0.0 and 1.0, got {}",
                health.error_rate_threshold
            ),
        });
    }

    if let Some(warning) = health.error_rate_warning_threshold {
        if !(0.0..=1.0).contains(&warning) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "health.error_rate_warning_threshold must be between 0.0 and 1.0, got {warning}"
                ),
            });
        } else if warning >= health.error_rate_threshold {
            errors.push(ConfigError::Validation {
                message: format!(
                    "health.error_rate_warning_threshold ({warning}) must be below health.error_rate_threshold ({})",
                    health.error_rate_threshold
                ),
            });
        }
    }

    if health.max_concurrent_evaluations == 0 {
        errors.push(ConfigError::Validation {
            message: "health.max_concurrent_evaluations must be at least 1".to_string(),
        });
    }

    if health.interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "health.interval_secs must be at least 1".to_string(),
        });
    }

    for (i, permission) in config.permissions.global.iter().enumerate() {
        if permission.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("permissions.global[{i}] must not be empty"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
