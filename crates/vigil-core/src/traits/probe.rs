// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Optional live probes a plugin may supply to the registry.

use async_trait::async_trait;

use crate::error::VigilError;
use crate::types::PerformanceMetrics;

/// Reports the plugin's current memory footprint.
#[async_trait]
pub trait MemoryProbe: Send + Sync + 'static {
    /// Resident memory attributed to the plugin, in bytes.
    async fn memory_usage(&self) -> Result<u64, VigilError>;
}

/// Reports the plugin's average call latency.
#[async_trait]
pub trait LatencyProbe: Send + Sync + 'static {
    /// Average response time in milliseconds.
    async fn average_response_time(&self) -> Result<f64, VigilError>;
}

/// Reports the plugin's call counters and timings.
#[async_trait]
pub trait MetricsProbe: Send + Sync + 'static {
    async fn performance_metrics(&self) -> Result<PerformanceMetrics, VigilError>;
}

/// Plugin-defined validation of its own configuration.
#[async_trait]
pub trait ConfigValidator: Send + Sync + 'static {
    /// Returns `false` when the plugin considers its configuration invalid.
    async fn validate_configuration(&self) -> Result<bool, VigilError>;
}
