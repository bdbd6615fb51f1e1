// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry, validation rules, and health evaluator.
//!
//! The registry tracks plugin descriptors and periodically evaluates them.
//! Each evaluation runs static validation rules (configuration, permissions,
//! version, freshness) and any capability probes the plugin exposes (memory,
//! latency, error rate, self-validation), then folds the failures into one
//! health verdict per plugin.

pub mod descriptor;
pub mod evaluator;
pub mod manifest;
pub mod probe;
pub mod recording;
pub mod registry;
pub mod rules;

pub use descriptor::PluginDescriptor;
pub use evaluator::{DependencyState, DependencyView, Evaluation, HealthEvaluator};
pub use manifest::{load_plugin_manifest, parse_plugin_manifest};
pub use probe::{Capabilities, FnProbe, ReportedMetrics};
pub use registry::PluginRegistry;
