// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability probe adapter.
//!
//! A plugin exposes zero or more live probes. [`Capabilities`] holds each one
//! in its own optional slot so the evaluator's "invoke if present" logic is a
//! plain `if let`. [`FnProbe`] lets hosts supply ordinary closures, and
//! [`ReportedMetrics`] turns statically reported numbers into probes.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vigil_core::{
    ConfigValidator, LatencyProbe, MemoryProbe, MetricsProbe, PerformanceMetrics, VigilError,
};

/// The optional live capabilities of one plugin.
///
/// Cloning is cheap: each slot is an `Arc`.
#[derive(Clone, Default)]
pub struct Capabilities {
    memory_usage: Option<Arc<dyn MemoryProbe>>,
    average_response_time: Option<Arc<dyn LatencyProbe>>,
    performance_metrics: Option<Arc<dyn MetricsProbe>>,
    validate_configuration: Option<Arc<dyn ConfigValidator>>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memory_usage(mut self, probe: impl MemoryProbe) -> Self {
        self.memory_usage = Some(Arc::new(probe));
        self
    }

    pub fn with_average_response_time(mut self, probe: impl LatencyProbe) -> Self {
        self.average_response_time = Some(Arc::new(probe));
        self
    }

    pub fn with_performance_metrics(mut self, probe: impl MetricsProbe) -> Self {
        self.performance_metrics = Some(Arc::new(probe));
        self
    }

    pub fn with_config_validator(mut self, probe: impl ConfigValidator) -> Self {
        self.validate_configuration = Some(Arc::new(probe));
        self
    }

    /// Closure shorthand for [`Capabilities::with_memory_usage`].
    pub fn memory_usage_fn<F>(self, f: F) -> Self
    where
        F: Fn() -> Result<u64, VigilError> + Send + Sync + 'static,
    {
        self.with_memory_usage(FnProbe::new(f))
    }

    /// Closure shorthand for [`Capabilities::with_average_response_time`].
    pub fn average_response_time_fn<F>(self, f: F) -> Self
    where
        F: Fn() -> Result<f64, VigilError> + Send + Sync + 'static,
    {
        self.with_average_response_time(FnProbe::new(f))
    }

    /// Closure shorthand for [`Capabilities::with_performance_metrics`].
    pub fn performance_metrics_fn<F>(self, f: F) -> Self
    where
        F: Fn() -> Result<PerformanceMetrics, VigilError> + Send + Sync + 'static,
    {
        self.with_performance_metrics(FnProbe::new(f))
    }

    /// Closure shorthand for [`Capabilities::with_config_validator`].
    pub fn validate_configuration_fn<F>(self, f: F) -> Self
    where
        F: Fn() -> Result<bool, VigilError> + Send + Sync + 'static,
    {
        self.with_config_validator(FnProbe::new(f))
    }

    pub fn memory_usage(&self) -> Option<&Arc<dyn MemoryProbe>> {
        self.memory_usage.as_ref()
    }

    pub fn average_response_time(&self) -> Option<&Arc<dyn LatencyProbe>> {
        self.average_response_time.as_ref()
    }

    pub fn performance_metrics(&self) -> Option<&Arc<dyn MetricsProbe>> {
        self.performance_metrics.as_ref()
    }

    pub fn validate_configuration(&self) -> Option<&Arc<dyn ConfigValidator>> {
        self.validate_configuration.as_ref()
    }

    /// True when the plugin exposes no probe at all.
    pub fn is_empty(&self) -> bool {
        self.memory_usage.is_none()
            && self.average_response_time.is_none()
            && self.performance_metrics.is_none()
            && self.validate_configuration.is_none()
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("memory_usage", &self.memory_usage.is_some())
            .field("average_response_time", &self.average_response_time.is_some())
            .field("performance_metrics", &self.performance_metrics.is_some())
            .field("validate_configuration", &self.validate_configuration.is_some())
            .finish()
    }
}

/// Adapts a synchronous closure into any of the probe traits.
pub struct FnProbe<F>(F);

impl<F> FnProbe<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> MemoryProbe for FnProbe<F>
where
    F: Fn() -> Result<u64, VigilError> + Send + Sync + 'static,
{
    async fn memory_usage(&self) -> Result<u64, VigilError> {
        (self.0)()
    }
}

#[async_trait]
impl<F> LatencyProbe for FnProbe<F>
where
    F: Fn() -> Result<f64, VigilError> + Send + Sync + 'static,
{
    async fn average_response_time(&self) -> Result<f64, VigilError> {
        (self.0)()
    }
}

#[async_trait]
impl<F> MetricsProbe for FnProbe<F>
where
    F: Fn() -> Result<PerformanceMetrics, VigilError> + Send + Sync + 'static,
{
    async fn performance_metrics(&self) -> Result<PerformanceMetrics, VigilError> {
        (self.0)()
    }
}

#[async_trait]
impl<F> ConfigValidator for FnProbe<F>
where
    F: Fn() -> Result<bool, VigilError> + Send + Sync + 'static,
{
    async fn validate_configuration(&self) -> Result<bool, VigilError> {
        (self.0)()
    }
}

/// Values a plugin reported out of band (for example in a manifest).
///
/// Each present field becomes a constant probe; absent fields stay absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportedMetrics {
    pub memory_usage_bytes: Option<u64>,
    pub average_response_time_ms: Option<f64>,
    pub error_count: Option<u64>,
    pub success_count: Option<u64>,
    pub config_valid: Option<bool>,
}

impl ReportedMetrics {
    pub fn into_capabilities(self) -> Capabilities {
        let mut caps = Capabilities::new();

        if let Some(bytes) = self.memory_usage_bytes {
            caps = caps.memory_usage_fn(move || Ok(bytes));
        }
        if let Some(ms) = self.average_response_time_ms {
            caps = caps.average_response_time_fn(move || Ok(ms));
        }
        if self.error_count.is_some() || self.success_count.is_some() {
            let snapshot = PerformanceMetrics {
                average_response_time_ms: self.average_response_time_ms.unwrap_or_default(),
                memory_usage_bytes: self.memory_usage_bytes.unwrap_or_default(),
                error_count: self.error_count.unwrap_or_default(),
                success_count: self.success_count.unwrap_or_default(),
                last_call_timestamp: None,
            };
            caps = caps.performance_metrics_fn(move || Ok(snapshot.clone()));
        }
        if let Some(valid) = self.config_valid {
            caps = caps.validate_configuration_fn(move || Ok(valid));
        }

        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::Capability;

    #[test]
    fn empty_capabilities_report_empty() {
        let caps = Capabilities::new();
        assert!(caps.is_empty());
        assert!(caps.memory_usage().is_none());
        assert_eq!(
            format!("{caps:?}"),
            "Capabilities { memory_usage: false, average_response_time: false, performance_metrics: false, validate_configuration: false }"
        );
    }

    #[tokio::test]
    async fn closures_become_probes() {
        let caps = Capabilities::new()
            .memory_usage_fn(|| Ok(4096))
            .validate_configuration_fn(|| Ok(false));

        assert!(!caps.is_empty());
        let memory = caps.memory_usage().unwrap().memory_usage().await.unwrap();
        assert_eq!(memory, 4096);
        let valid = caps
            .validate_configuration()
            .unwrap()
            .validate_configuration()
            .await
            .unwrap();
        assert!(!valid);
        assert!(caps.average_response_time().is_none());
    }

    #[tokio::test]
    async fn closure_errors_propagate() {
        let caps = Capabilities::new().average_response_time_fn(|| {
            Err(VigilError::probe(Capability::AverageResponseTime, "no samples"))
        });
        let err = caps
            .average_response_time()
            .unwrap()
            .average_response_time()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no samples"));
    }

    #[tokio::test]
    async fn reported_counts_produce_metrics_probe() {
        let reported = ReportedMetrics {
            error_count: Some(3),
            success_count: Some(7),
            average_response_time_ms: Some(12.5),
            ..Default::default()
        };
        let caps = reported.into_capabilities();

        assert!(caps.memory_usage().is_none());
        assert!(caps.average_response_time().is_some());
        let metrics = caps
            .performance_metrics()
            .unwrap()
            .performance_metrics()
            .await
            .unwrap();
        assert_eq!(metrics.error_count, 3);
        assert_eq!(metrics.success_count, 7);
        assert_eq!(metrics.average_response_time_ms, 12.5);
    }

    #[test]
    fn nothing_reported_means_no_probes() {
        assert!(ReportedMetrics::default().into_capabilities().is_empty());
    }
}
