// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin manifest parsing from `plugins.toml` files.
//!
//! A manifest lists plugins as `[[plugin]]` tables. Live probes cannot be
//! expressed in TOML; a `[plugin.reported]` table supplies static values
//! that are turned into constant probes instead. Plugins listed with
//! `enabled = false` are loaded with the `disabled` verdict.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use vigil_core::{HealthVerdict, PluginCategory, VigilError};

use crate::descriptor::PluginDescriptor;
use crate::probe::ReportedMetrics;

/// Top-level TOML document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    #[serde(default)]
    plugin: Vec<PluginSection>,
}

/// One `[[plugin]]` table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PluginSection {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    author: String,
    #[serde(default)]
    description: String,
    version: String,
    category: String,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    config: Option<Map<String, Value>>,
    #[serde(default)]
    permissions: Vec<String>,
    #[serde(default)]
    last_updated: Option<toml::Value>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    reported: Option<ReportedMetrics>,
}

fn default_enabled() -> bool {
    true
}

/// Parse plugin descriptors from TOML content.
///
/// Rejects blank ids, duplicate ids, unknown categories, and timestamps that
/// are not RFC 3339.
pub fn parse_plugin_manifest(toml_content: &str) -> Result<Vec<PluginDescriptor>, VigilError> {
    let file: ManifestFile = toml::from_str(toml_content)
        .map_err(|e| VigilError::Manifest(format!("invalid plugin manifest: {e}")))?;

    let mut seen = HashSet::new();
    let mut descriptors = Vec::with_capacity(file.plugin.len());

    for (index, section) in file.plugin.into_iter().enumerate() {
        if section.id.trim().is_empty() {
            return Err(VigilError::Manifest(format!(
                "plugin[{index}]: id must not be empty"
            )));
        }
        if !seen.insert(section.id.clone()) {
            return Err(VigilError::Manifest(format!(
                "duplicate plugin id `{}`",
                section.id
            )));
        }
        descriptors.push(into_descriptor(section)?);
    }

    Ok(descriptors)
}

/// Read and parse a manifest file.
pub fn load_plugin_manifest(path: &Path) -> Result<Vec<PluginDescriptor>, VigilError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        VigilError::Manifest(format!("failed to read {}: {e}", path.display()))
    })?;
    let descriptors = parse_plugin_manifest(&content)?;
    tracing::debug!(path = %path.display(), plugins = descriptors.len(), "manifest loaded");
    Ok(descriptors)
}

fn into_descriptor(section: PluginSection) -> Result<PluginDescriptor, VigilError> {
    let category = PluginCategory::from_str(&section.category).map_err(|_| {
        VigilError::Manifest(format!(
            "plugin `{}`: invalid category '{}'. Expected one of: ai, integration, ui, utility, experimental",
            section.id, section.category
        ))
    })?;

    let last_updated = section
        .last_updated
        .map(|value| parse_timestamp(&section.id, value))
        .transpose()?;

    let capabilities = section
        .reported
        .map(ReportedMetrics::into_capabilities)
        .unwrap_or_default();

    Ok(PluginDescriptor {
        name: section.name.unwrap_or_else(|| section.id.clone()),
        id: section.id,
        author: section.author,
        description: section.description,
        version: section.version,
        category,
        enabled: section.enabled,
        config: section.config,
        permissions: section.permissions.into_iter().collect(),
        health: (!section.enabled).then_some(HealthVerdict::Disabled),
        last_updated,
        dependencies: section.dependencies,
        capabilities,
    })
}

/// Accept a native TOML datetime or an RFC 3339 string.
fn parse_timestamp(id: &str, value: toml::Value) -> Result<DateTime<Utc>, VigilError> {
    let raw = match value {
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::String(s) => s,
        other => {
            return Err(VigilError::Manifest(format!(
                "plugin `{id}`: last_updated must be a datetime, got {}",
                other.type_str()
            )));
        }
    };

    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            VigilError::Manifest(format!(
                "plugin `{id}`: last_updated `{raw}` is not an RFC 3339 timestamp: {e}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_full_manifest() {
        let toml = r#"
[[plugin]]
id = "weather"
name = "Weather Feed"
author = "Vigil Contributors"
description = "Pulls forecasts"
version = "1.4.0"
category = "integration"
permissions = ["api-access", "network-access"]
dependencies = ["http"]
last_updated = 2026-10-01T12:00:00Z

[plugin.config]
endpoint = "https://api.weather.example"
apiKey = "secret"

[plugin.reported]
memory_usage_bytes = 1024
error_count = 1
success_count = 99

[[plugin]]
id = "http"
version = "1.0.0"
category = "utility"
enabled = false
last_updated = "2026-09-01T00:00:00+02:00"
"#;
        let plugins = parse_plugin_manifest(toml).unwrap();
        assert_eq!(plugins.len(), 2);

        let weather = &plugins[0];
        assert_eq!(weather.name, "Weather Feed");
        assert_eq!(weather.category, PluginCategory::Integration);
        assert_eq!(weather.permissions.len(), 2);
        assert_eq!(weather.dependencies, vec!["http"]);
        assert_eq!(
            weather.config_value("endpoint"),
            Some(&json!("https://api.weather.example"))
        );
        assert_eq!(
            weather.last_updated.unwrap().to_rfc3339(),
            "2026-10-01T12:00:00+00:00"
        );
        assert!(weather.capabilities.memory_usage().is_some());
        assert!(weather.capabilities.performance_metrics().is_some());
        assert!(weather.capabilities.average_response_time().is_none());
        assert!(weather.health.is_none());

        let http = &plugins[1];
        assert_eq!(http.name, "http");
        assert!(!http.enabled);
        assert_eq!(http.health, Some(HealthVerdict::Disabled));
        assert!(http.config.is_none());
        assert!(http.capabilities.is_empty());
        assert_eq!(
            http.last_updated.unwrap().to_rfc3339(),
            "2026-08-31T22:00:00+00:00"
        );
    }

    #[test]
    fn empty_manifest_has_no_plugins() {
        assert!(parse_plugin_manifest("").unwrap().is_empty());
    }

    #[test]
    fn parse_invalid_category() {
        let toml = r#"
[[plugin]]
id = "bad"
version = "1.0.0"
category = "widget"
"#;
        let err = parse_plugin_manifest(toml).unwrap_err().to_string();
        assert!(err.contains("invalid category"));
    }

    #[test]
    fn parse_blank_id() {
        let toml = r#"
[[plugin]]
id = " "
version = "1.0.0"
category = "ui"
"#;
        let err = parse_plugin_manifest(toml).unwrap_err().to_string();
        assert!(err.contains("id must not be empty"));
    }

    #[test]
    fn parse_duplicate_id() {
        let toml = r#"
[[plugin]]
id = "same"
version = "1.0.0"
category = "ui"

[[plugin]]
id = "same"
version = "2.0.0"
category = "ai"
"#;
        let err = parse_plugin_manifest(toml).unwrap_err().to_string();
        assert!(err.contains("duplicate plugin id `same`"));
    }

    #[test]
    fn parse_bad_timestamp() {
        let toml = r#"
[[plugin]]
id = "p"
version = "1.0.0"
category = "utility"
last_updated = "yesterday"
"#;
        let err = parse_plugin_manifest(toml).unwrap_err().to_string();
        assert!(err.contains("RFC 3339"));
    }

    #[test]
    fn parse_unknown_field_rejected() {
        let toml = r#"
[[plugin]]
id = "p"
version = "1.0.0"
category = "utility"
health = "healthy"
"#;
        assert!(parse_plugin_manifest(toml).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugins.toml");
        std::fs::write(
            &path,
            "[[plugin]]\nid = \"p\"\nversion = \"1.0.0\"\ncategory = \"ai\"\n",
        )
        .unwrap();
        let plugins = load_plugin_manifest(&path).unwrap();
        assert_eq!(plugins[0].category, PluginCategory::Ai);

        let missing = load_plugin_manifest(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, VigilError::Manifest(_)));
    }
}
