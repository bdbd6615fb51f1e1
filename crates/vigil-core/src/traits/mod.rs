// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability probe traits.
//!
//! Each capability a plugin may expose is its own trait so the evaluator can
//! hold them as independently optional trait objects. All probes use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod probe;

pub use probe::{ConfigValidator, LatencyProbe, MemoryProbe, MetricsProbe};
