// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Vigil configuration system.

use vigil_config::diagnostic::ConfigError;
use vigil_config::model::{VigilConfig, MIB};
use vigil_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_vigil_config() {
    let toml = r#"
[registry]
log_level = "debug"
manifest_path = "/srv/plugins.toml"

[health]
stale_after_days = 30
max_memory_bytes = 104857600
max_response_time_ms = 2500.0
error_rate_threshold = 0.4
error_rate_warning_threshold = 0.1
max_concurrent_evaluations = 8
interval_secs = 15

[permissions]
global = ["telemetry"]
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.registry.log_level, "debug");
    assert_eq!(config.registry.manifest_path, "/srv/plugins.toml");
    assert_eq!(config.health.stale_after_days, 30);
    assert_eq!(config.health.max_memory_bytes, 100 * MIB);
    assert_eq!(config.health.max_response_time_ms, 2500.0);
    assert_eq!(config.health.error_rate_threshold, 0.4);
    assert_eq!(config.health.error_rate_warning_threshold, Some(0.1));
    assert_eq!(config.health.max_concurrent_evaluations, 8);
    assert_eq!(config.health.interval_secs, 15);
    assert_eq!(config.permissions.global, vec!["telemetry"]);
}

/// An empty document yields the compiled defaults.
#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").expect("empty TOML is valid");
    assert_eq!(config, VigilConfig::default());
    assert_eq!(config.health.stale_after_days, 90);
    assert_eq!(config.health.max_memory_bytes, 50 * 1024 * 1024);
    assert_eq!(config.health.max_response_time_ms, 5000.0);
    assert_eq!(config.health.error_rate_threshold, 0.5);
    assert!(config.health.error_rate_warning_threshold.is_none());
    assert!(config.permissions.global.is_empty());
}

/// Unknown field in [health] is rejected with a suggestion.
#[test]
fn unknown_field_in_health_suggests_correction() {
    let toml = r#"
[health]
stale_afterdays = 10
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { key, suggestion: Some(s), .. }
            if key == "stale_afterdays" && s == "stale_after_days"
    )));
}

/// Unknown top-level section is rejected.
#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[plugins]
enabled = true
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject unknown section");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "plugins")));
}

/// Wrong value type produces an InvalidType diagnostic.
#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[health]
interval_secs = "often"
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject wrong type");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { .. })));
}

/// Semantically invalid values pass deserialization but fail validation.
#[test]
fn semantic_validation_runs_after_parse() {
    let toml = r#"
[health]
error_rate_threshold = 2.0
"#;
    let errors = load_and_validate_str(toml).expect_err("threshold out of range");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::Validation { message } if message.contains("error_rate_threshold")
    )));
}

/// Config round-trips through TOML serialization (used by `vigil config`).
#[test]
fn config_serializes_to_toml() {
    let config = VigilConfig::default();
    let rendered = toml::to_string_pretty(&config).expect("serializable");
    assert!(rendered.contains("[health]"));
    let parsed = load_config_from_str(&rendered).expect("re-parse");
    assert_eq!(parsed, config);
}
