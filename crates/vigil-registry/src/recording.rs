// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics. Without a recorder installed every call is a no-op.

use std::time::Duration;

use metrics::{describe_counter, describe_gauge, describe_histogram};
use strum::IntoEnumIterator;
use vigil_core::{Capability, HealthSummary, HealthVerdict};

/// Register all Vigil metric descriptions.
///
/// Called once after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "vigil_health_evaluations_total",
        "Plugin evaluations by resulting verdict"
    );
    describe_counter!(
        "vigil_probe_failures_total",
        "Capability probe failures by capability"
    );
    describe_counter!(
        "vigil_evaluation_panics_total",
        "Plugin evaluations aborted by a panic"
    );
    describe_gauge!("vigil_plugins", "Registered plugins by current verdict");
    describe_histogram!(
        "vigil_health_pass_duration_seconds",
        "Wall-clock duration of a full health check pass"
    );
}

/// Record the verdict of one plugin evaluation.
pub fn record_evaluation(verdict: HealthVerdict) {
    metrics::counter!("vigil_health_evaluations_total", "verdict" => verdict.to_string())
        .increment(1);
}

/// Record a failed capability probe.
pub fn record_probe_failure(capability: Capability) {
    metrics::counter!("vigil_probe_failures_total", "capability" => capability.to_string())
        .increment(1);
}

/// Record an evaluation that panicked.
///
/// The panicking capability is unknown, so panics are not part of
/// `vigil_probe_failures_total`.
pub fn record_evaluation_panic() {
    metrics::counter!("vigil_evaluation_panics_total").increment(1);
}

/// Record a finished pass: its duration and the resulting verdict counts.
pub fn record_pass(duration: Duration, summary: &HealthSummary) {
    metrics::histogram!("vigil_health_pass_duration_seconds").record(duration.as_secs_f64());
    for verdict in HealthVerdict::iter() {
        metrics::gauge!("vigil_plugins", "verdict" => verdict.to_string())
            .set(summary.count(verdict) as f64);
    }
}
