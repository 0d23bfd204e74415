//! Prometheus metrics collection for modelroute
//!
//! Tracks resolutions by task and provider, resolution failures, probe
//! outcomes and classified provider errors. Exposed via `/metrics` in
//! Prometheus text format.
//!
//! All label values come from closed enums, so cardinality is fixed.

use crate::classify::ErrorCategory;
use crate::providers::{Provider, Task};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Probe operation label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOperation {
    Connection,
    Discovery,
}

impl ProbeOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Discovery => "discovery",
        }
    }
}

/// Probe outcome label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success,
    Failure,
}

impl ProbeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl From<bool> for ProbeOutcome {
    fn from(ok: bool) -> Self {
        if ok { Self::Success } else { Self::Failure }
    }
}

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
    resolutions_total: IntCounterVec,
    resolution_failures_total: IntCounterVec,
    probes_total: IntCounterVec,
    classified_errors_total: IntCounterVec,
}

impl Metrics {
    /// Create a new Metrics instance with its own registry
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Cardinality: 5 tasks × 4 providers
        let resolutions_total = IntCounterVec::new(
            Opts::new(
                "modelroute_resolutions_total",
                "Total successful model resolutions by task and provider",
            ),
            &["task", "provider"],
        )?;

        let resolution_failures_total = IntCounterVec::new(
            Opts::new(
                "modelroute_resolution_failures_total",
                "Total model resolutions that found no usable provider, by task",
            ),
            &["task"],
        )?;

        let probes_total = IntCounterVec::new(
            Opts::new(
                "modelroute_probes_total",
                "Total self-hosted provider probes by operation and outcome",
            ),
            &["operation", "outcome"],
        )?;

        let classified_errors_total = IntCounterVec::new(
            Opts::new(
                "modelroute_classified_errors_total",
                "Total provider errors by user-facing category",
            ),
            &["category"],
        )?;

        registry.register(Box::new(resolutions_total.clone()))?;
        registry.register(Box::new(resolution_failures_total.clone()))?;
        registry.register(Box::new(probes_total.clone()))?;
        registry.register(Box::new(classified_errors_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            resolutions_total,
            resolution_failures_total,
            probes_total,
            classified_errors_total,
        })
    }

    /// Record a successful resolution
    pub fn record_resolution(
        &self,
        task: Task,
        provider: Provider,
    ) -> Result<(), prometheus::Error> {
        self.resolutions_total
            .get_metric_with_label_values(&[task.as_str(), provider.as_str()])?
            .inc();
        Ok(())
    }

    /// Record a resolution that found no usable provider
    pub fn record_resolution_failure(&self, task: Task) -> Result<(), prometheus::Error> {
        self.resolution_failures_total
            .get_metric_with_label_values(&[task.as_str()])?
            .inc();
        Ok(())
    }

    /// Record a probe outcome
    pub fn record_probe(
        &self,
        operation: ProbeOperation,
        outcome: ProbeOutcome,
    ) -> Result<(), prometheus::Error> {
        self.probes_total
            .get_metric_with_label_values(&[operation.as_str(), outcome.as_str()])?
            .inc();
        Ok(())
    }

    /// Record a classified provider error
    pub fn record_classified_error(
        &self,
        category: ErrorCategory,
    ) -> Result<(), prometheus::Error> {
        self.classified_errors_total
            .get_metric_with_label_values(&[category.as_str()])?
            .inc();
        Ok(())
    }

    /// Current resolution count, for tests and health output
    pub fn resolutions_count(&self, task: Task, provider: Provider) -> u64 {
        self.resolutions_total
            .get_metric_with_label_values(&[task.as_str(), provider.as_str()])
            .map(|c| c.get())
            .unwrap_or(0)
    }

    /// Current probe count for an operation and outcome
    pub fn probes_count(&self, operation: ProbeOperation, outcome: ProbeOutcome) -> u64 {
        self.probes_total
            .get_metric_with_label_values(&[operation.as_str(), outcome.as_str()])
            .map(|c| c.get())
            .unwrap_or(0)
    }

    /// Render all metrics in Prometheus text format
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| {
            prometheus::Error::Msg(format!("Metrics output is not valid UTF-8: {}", e))
        })
    }
}

/// Log a metrics recording failure without failing the caller
pub fn log_recording_failure(operation: &str, result: Result<(), prometheus::Error>) {
    if let Err(e) = result {
        tracing::warn!(operation = %operation, error = %e, "Failed to record metric");
    }
}
