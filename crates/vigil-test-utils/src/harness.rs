// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end health-check testing.
//!
//! `TestHarness` assembles a registry from a config and a set of plugins and
//! runs every pass at a fixed clock, so freshness checks do not depend on when
//! the test runs.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use vigil_config::VigilConfig;
use vigil_core::{HealthReport, HealthVerdict, VigilError};
use vigil_registry::{PluginDescriptor, PluginRegistry, parse_plugin_manifest};

use crate::mock_probe::MockProbe;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: VigilConfig,
    config_toml: Option<String>,
    plugins: Vec<PluginDescriptor>,
    manifests: Vec<String>,
    now: Option<DateTime<Utc>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: VigilConfig::default(),
            config_toml: None,
            plugins: Vec::new(),
            manifests: Vec::new(),
            now: None,
        }
    }

    pub fn with_config(mut self, config: VigilConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a TOML config document, validated on build.
    pub fn with_config_toml(mut self, toml: impl Into<String>) -> Self {
        self.config_toml = Some(toml.into());
        self
    }

    /// Register a plugin. A missing `last_updated` is set to the harness clock.
    pub fn with_plugin(mut self, plugin: PluginDescriptor) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Register a plugin whose capabilities are backed by `probe`.
    pub fn with_probed_plugin(self, plugin: PluginDescriptor, probe: &MockProbe) -> Self {
        self.with_plugin(plugin.with_capabilities(probe.capabilities()))
    }

    /// Register every plugin in a `plugins.toml` document.
    pub fn with_manifest(mut self, toml: impl Into<String>) -> Self {
        self.manifests.push(toml.into());
        self
    }

    /// Fix the evaluation clock. Defaults to the time of `build()`.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Build the harness and register every plugin.
    pub async fn build(self) -> Result<TestHarness, VigilError> {
        let config = match self.config_toml {
            Some(toml) => vigil_config::load_and_validate_str(&toml).map_err(|errors| {
                let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
                VigilError::Config(messages.join("; "))
            })?,
            None => self.config,
        };
        let now = self.now.unwrap_or_else(Utc::now);
        let registry = Arc::new(PluginRegistry::from_config(&config));

        let mut plugins = self.plugins;
        for manifest in &self.manifests {
            plugins.extend(parse_plugin_manifest(manifest)?);
        }
        for mut plugin in plugins {
            plugin.last_updated.get_or_insert(now);
            registry.register_plugin(plugin)?;
        }

        tracing::debug!(plugins = registry.len(), %now, "test harness ready");
        Ok(TestHarness {
            registry,
            config,
            now,
        })
    }
}

/// A registry with deterministic health-check passes.
pub struct TestHarness {
    /// The registry under test.
    pub registry: Arc<PluginRegistry>,
    /// Effective configuration.
    pub config: VigilConfig,
    now: DateTime<Utc>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The clock every pass is evaluated at.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Move the clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Run one pass at the harness clock.
    pub async fn check(&self) -> Vec<HealthReport> {
        self.registry.run_health_check_at(self.now).await
    }

    /// Stored verdict of a plugin.
    pub fn verdict(&self, id: &str) -> Option<HealthVerdict> {
        self.registry.get_plugin(id).map(|plugin| plugin.health())
    }

    /// Every stored verdict, sorted by plugin id.
    pub fn verdicts(&self) -> Vec<(String, HealthVerdict)> {
        self.registry
            .get_all_plugins()
            .into_iter()
            .map(|plugin| {
                let verdict = plugin.health();
                (plugin.id, verdict)
            })
            .collect()
    }
}
