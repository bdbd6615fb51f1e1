// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted capability probe for deterministic testing.
//!
//! `MockProbe` implements all four probe traits from shared state, so a test
//! can attach it to a plugin, change its readings between passes, and count
//! how often the evaluator called each capability.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use vigil_core::{
    Capability, ConfigValidator, LatencyProbe, MemoryProbe, MetricsProbe, PerformanceMetrics,
    VigilError,
};
use vigil_registry::Capabilities;

/// How a capability behaves when called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Answer,
    Fail,
    Panic,
}

#[derive(Debug)]
struct ProbeState {
    memory_usage_bytes: u64,
    average_response_time_ms: f64,
    metrics: PerformanceMetrics,
    config_valid: bool,
    modes: HashMap<Capability, Mode>,
    calls: HashMap<Capability, usize>,
}

/// A probe whose readings are set by the test.
///
/// Clones share state. A fresh probe reports healthy readings: 1 MiB of
/// memory, 25ms latency, 100 successful calls and a valid configuration.
#[derive(Debug, Clone)]
pub struct MockProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl MockProbe {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ProbeState {
                memory_usage_bytes: 1024 * 1024,
                average_response_time_ms: 25.0,
                metrics: PerformanceMetrics {
                    average_response_time_ms: 25.0,
                    memory_usage_bytes: 1024 * 1024,
                    error_count: 0,
                    success_count: 100,
                    last_call_timestamp: None,
                },
                config_valid: true,
                modes: HashMap::new(),
                calls: HashMap::new(),
            })),
        }
    }

    /// Capabilities backed by this probe, one slot per trait.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::new()
            .with_memory_usage(self.clone())
            .with_average_response_time(self.clone())
            .with_performance_metrics(self.clone())
            .with_config_validator(self.clone())
    }

    pub async fn set_memory_usage(&self, bytes: u64) {
        self.state.lock().await.memory_usage_bytes = bytes;
    }

    pub async fn set_average_response_time(&self, ms: f64) {
        self.state.lock().await.average_response_time_ms = ms;
    }

    /// Set the call counts reported by the metrics capability.
    pub async fn set_call_counts(&self, errors: u64, successes: u64) {
        let mut state = self.state.lock().await;
        state.metrics.error_count = errors;
        state.metrics.success_count = successes;
    }

    pub async fn set_performance_metrics(&self, metrics: PerformanceMetrics) {
        self.state.lock().await.metrics = metrics;
    }

    pub async fn set_config_valid(&self, valid: bool) {
        self.state.lock().await.config_valid = valid;
    }

    /// Make `capability` return a probe error.
    pub async fn fail(&self, capability: Capability) {
        self.state.lock().await.modes.insert(capability, Mode::Fail);
    }

    /// Make `capability` panic.
    pub async fn panic_on(&self, capability: Capability) {
        self.state.lock().await.modes.insert(capability, Mode::Panic);
    }

    /// Restore normal answers for every capability.
    pub async fn recover(&self) {
        self.state.lock().await.modes.clear();
    }

    /// Number of times `capability` has been called.
    pub async fn calls(&self, capability: Capability) -> usize {
        self.state
            .lock()
            .await
            .calls
            .get(&capability)
            .copied()
            .unwrap_or(0)
    }

    /// Record the call and apply the scripted mode, then read a value.
    async fn answer<T>(
        &self,
        capability: Capability,
        read: impl FnOnce(&ProbeState) -> T,
    ) -> Result<T, VigilError> {
        let mut state = self.state.lock().await;
        *state.calls.entry(capability).or_insert(0) += 1;
        match state.modes.get(&capability).copied().unwrap_or(Mode::Answer) {
            Mode::Answer => Ok(read(&*state)),
            Mode::Fail => Err(VigilError::probe(capability, "scripted failure")),
            Mode::Panic => {
                drop(state);
                panic!("scripted {capability} panic");
            }
        }
    }
}

impl Default for MockProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryProbe for MockProbe {
    async fn memory_usage(&self) -> Result<u64, VigilError> {
        self.answer(Capability::MemoryUsage, |s| s.memory_usage_bytes)
            .await
    }
}

#[async_trait]
impl LatencyProbe for MockProbe {
    async fn average_response_time(&self) -> Result<f64, VigilError> {
        self.answer(Capability::AverageResponseTime, |s| {
            s.average_response_time_ms
        })
        .await
    }
}

#[async_trait]
impl MetricsProbe for MockProbe {
    async fn performance_metrics(&self) -> Result<PerformanceMetrics, VigilError> {
        self.answer(Capability::PerformanceMetrics, |s| s.metrics.clone())
            .await
    }
}

#[async_trait]
impl ConfigValidator for MockProbe {
    async fn validate_configuration(&self) -> Result<bool, VigilError> {
        self.answer(Capability::ValidateConfiguration, |s| s.config_valid)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_readings_are_healthy() {
        let probe = MockProbe::new();
        assert_eq!(probe.memory_usage().await.unwrap(), 1024 * 1024);
        assert_eq!(probe.average_response_time().await.unwrap(), 25.0);
        assert_eq!(probe.performance_metrics().await.unwrap().error_rate(), Some(0.0));
        assert!(probe.validate_configuration().await.unwrap());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let probe = MockProbe::new();
        let clone = probe.clone();
        clone.set_memory_usage(7).await;
        assert_eq!(probe.memory_usage().await.unwrap(), 7);
        assert_eq!(clone.calls(Capability::MemoryUsage).await, 1);
    }

    #[tokio::test]
    async fn fail_and_recover() {
        let probe = MockProbe::new();
        probe.fail(Capability::AverageResponseTime).await;
        let err = probe.average_response_time().await.unwrap_err();
        assert!(matches!(
            err,
            VigilError::Probe {
                capability: Capability::AverageResponseTime,
                ..
            }
        ));
        probe.recover().await;
        assert!(probe.average_response_time().await.is_ok());
        assert_eq!(probe.calls(Capability::AverageResponseTime).await, 2);
    }

    #[tokio::test]
    async fn capabilities_fill_every_slot() {
        let caps = MockProbe::new().capabilities();
        assert!(caps.memory_usage().is_some());
        assert!(caps.average_response_time().is_some());
        assert!(caps.performance_metrics().is_some());
        assert!(caps.validate_configuration().is_some());
    }
}
