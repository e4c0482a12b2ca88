//! Observability for exporter workload rendering
//!
//! Provides:
//! - Prometheus counters for built workloads, build failures and image resolutions
//! - Structured logging with tracing
//!
//! Counters are registered in the default Prometheus registry and are only
//! observable when a long-running host embeds the library and exposes
//! `prometheus::gather()`; one-shot rendering does not publish them.

use crate::exporter::ExporterFlagSet;
use crate::image::RegistryConfig;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<BuilderMetricsInner> = OnceLock::new();

struct BuilderMetricsInner {
    workloads_built: IntCounter,
    build_errors: IntCounter,
    image_resolutions: IntCounterVec,
}

impl BuilderMetricsInner {
    fn new() -> Self {
        Self {
            workloads_built: register_int_counter!(
                "exporter_workloads_built_total",
                "Total number of exporter deployments rendered"
            )
            .expect("Failed to register workloads_built"),

            build_errors: register_int_counter!(
                "exporter_workload_build_errors_total",
                "Total number of exporter deployments rejected"
            )
            .expect("Failed to register build_errors"),

            image_resolutions: register_int_counter_vec!(
                "exporter_image_resolutions_total",
                "Total number of image references resolved",
                &["product"]
            )
            .expect("Failed to register image_resolutions"),
        }
    }
}

/// Handle to the process-wide builder metrics
///
/// Clones share the same underlying counters.
#[derive(Clone)]
pub struct BuilderMetrics {
    _private: (),
}

impl Default for BuilderMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl BuilderMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(BuilderMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &BuilderMetricsInner {
        GLOBAL_METRICS.get_or_init(BuilderMetricsInner::new)
    }

    pub fn inc_workloads_built(&self) {
        self.inner().workloads_built.inc();
    }

    pub fn inc_build_errors(&self) {
        self.inner().build_errors.inc();
    }

    pub fn inc_image_resolutions(&self, product: &str) {
        self.inner()
            .image_resolutions
            .with_label_values(&[product])
            .inc();
    }

    pub fn workloads_built(&self) -> u64 {
        self.inner().workloads_built.get()
    }

    pub fn build_errors(&self) -> u64 {
        self.inner().build_errors.get()
    }
}

/// Structured logger for rendering events
#[derive(Clone)]
pub struct StructuredLogger {
    component: String,
}

impl StructuredLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    /// Log the frozen startup configuration
    pub fn log_configured(&self, registry: &RegistryConfig, flags: &ExporterFlagSet) {
        let enabled: Vec<&str> = flags.enabled().map(|flag| flag.id()).collect();
        info!(
            event = "configured",
            component = %self.component,
            registry = %registry.registry,
            suffix = %registry.suffix,
            namespaces = registry.namespaces.len(),
            exporter_flags = ?enabled,
            "Image registry and exporter flags configured"
        );
    }

    pub fn log_workload_built(&self, instance: &str, namespace: &str, deployment: &str, image: &str) {
        info!(
            event = "workload_built",
            component = %self.component,
            instance = %instance,
            namespace = %namespace,
            deployment = %deployment,
            image = %image,
            "Rendered exporter deployment"
        );
    }

    pub fn log_build_failed(&self, instance: &str, namespace: &str, reason: &str) {
        warn!(
            event = "workload_build_failed",
            component = %self.component,
            instance = %instance,
            namespace = %namespace,
            reason = %reason,
            "Exporter deployment not rendered"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_metrics_counters() {
        let metrics = BuilderMetrics::new();
        let before = metrics.workloads_built();
        metrics.inc_workloads_built();
        metrics.inc_image_resolutions("kibana");
        assert!(metrics.workloads_built() > before);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("exporter");
        assert_eq!(logger.component, "exporter");
        logger.log_configured(&RegistryConfig::default(), &ExporterFlagSet::new());
    }
}
