// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Vigil plugin registry.

use thiserror::Error;

use crate::types::Capability;

/// The primary error type used across the registry, its probes, and the CLI.
///
/// A failing validation check is not an error: it is reported as a
/// [`CheckFailure`](crate::types::CheckFailure) and folded into the verdict.
#[derive(Debug, Error)]
pub enum VigilError {
    /// Configuration errors (invalid TOML, bad threshold values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A plugin manifest file could not be read or parsed.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// A descriptor was rejected at registration. Nothing was written.
    #[error("invalid registration: {reason}")]
    InvalidRegistration { reason: String },

    /// A capability probe failed while evaluating a plugin.
    #[error("{capability} probe failed for plugin {plugin_id}: {message}")]
    Probe {
        plugin_id: String,
        capability: Capability,
        message: String,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VigilError {
    /// Convenience constructor for probe implementations.
    ///
    /// Probes do not know which plugin they belong to; the evaluator fills
    /// in `plugin_id` via [`VigilError::for_plugin`] before surfacing it.
    pub fn probe(capability: Capability, message: impl Into<String>) -> Self {
        VigilError::Probe {
            plugin_id: String::new(),
            capability,
            message: message.into(),
        }
    }

    /// Attach the owning plugin id to a probe error. Other variants are
    /// returned unchanged.
    pub fn for_plugin(self, id: &str) -> Self {
        match self {
            VigilError::Probe {
                capability,
                message,
                ..
            } => VigilError::Probe {
                plugin_id: id.to_string(),
                capability,
                message,
            },
            other => other,
        }
    }
}
