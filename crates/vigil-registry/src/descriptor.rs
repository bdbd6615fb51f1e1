// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin descriptor: identity, configuration, permissions, and state of one plugin.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use vigil_core::{HealthVerdict, PluginCategory};

use crate::probe::Capabilities;

/// Everything the registry knows about one plugin.
///
/// `health` and `last_updated` are optional on the way in; the registry
/// fills them at registration, so stored descriptors always carry both.
#[derive(Clone, Serialize)]
pub struct PluginDescriptor {
    /// Unique key, immutable once registered.
    pub id: String,
    pub name: String,
    pub author: String,
    pub description: String,
    /// Expected to match `MAJOR.MINOR.PATCH[-prerelease]`.
    pub version: String,
    pub category: PluginCategory,
    pub enabled: bool,
    /// Open key/value configuration. `None` skips the completeness check.
    pub config: Option<Map<String, Value>>,
    pub permissions: BTreeSet<String>,
    pub health: Option<HealthVerdict>,
    pub last_updated: Option<DateTime<Utc>>,
    /// Plugin ids that must be enabled and healthy.
    pub dependencies: Vec<String>,
    #[serde(skip)]
    pub capabilities: Capabilities,
}

impl PluginDescriptor {
    /// A minimal enabled descriptor with no config, permissions, or probes.
    pub fn new(id: impl Into<String>, category: PluginCategory, version: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            author: String::new(),
            description: String::new(),
            version: version.into(),
            category,
            enabled: true,
            config: None,
            permissions: BTreeSet::new(),
            health: None,
            last_updated: None,
            dependencies: Vec::new(),
            capabilities: Capabilities::default(),
        }
    }

    /// Current verdict; `Healthy` when none has been assigned yet.
    pub fn health(&self) -> HealthVerdict {
        self.health.unwrap_or_default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the configuration map. Non-object JSON values are ignored.
    pub fn with_config(mut self, config: Value) -> Self {
        if let Value::Object(map) = config {
            self.config = Some(map);
        }
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_health(mut self, health: HealthVerdict) -> Self {
        self.health = Some(health);
        self
    }

    pub fn with_last_updated(mut self, at: DateTime<Utc>) -> Self {
        self.last_updated = Some(at);
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Look up a config value by key.
    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.as_ref().and_then(|c| c.get(key))
    }
}

impl std::fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("category", &self.category)
            .field("enabled", &self.enabled)
            .field("health", &self.health)
            .field("last_updated", &self.last_updated)
            .field("permissions", &self.permissions)
            .field("dependencies", &self.dependencies)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}
