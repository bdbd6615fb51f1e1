// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Vigil plugin registry.
//!
//! This crate provides the error type, the health vocabulary (categories,
//! verdicts, severities, checks), the performance snapshot, and the
//! capability probe traits shared by the rest of the workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::VigilError;
pub use types::{
    Capability, CheckFailure, CheckKind, HealthReport, HealthSummary, HealthVerdict,
    PerformanceMetrics, PluginCategory, Severity,
};

pub use traits::{ConfigValidator, LatencyProbe, MemoryProbe, MetricsProbe};
