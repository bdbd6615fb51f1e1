// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Vigil integration tests.
//!
//! Provides scripted capability probes and a harness that assembles a
//! registry with fixed thresholds and a fixed evaluation clock.
//!
//! # Components
//!
//! - [`MockProbe`] - Scripted probe implementing every capability trait
//! - [`TestHarness`] - Registry plus config with deterministic passes

pub mod harness;
pub mod mock_probe;

pub use harness::TestHarness;
pub use mock_probe::MockProbe;
