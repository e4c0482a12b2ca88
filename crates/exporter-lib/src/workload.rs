//! Exporter deployment rendering
//!
//! [`WorkloadBuilder`] turns an [`ElasticsearchInstance`] into a complete
//! `apps/v1` Deployment running one exporter container. Building is a pure
//! function of the startup configuration and the instance; nothing is
//! retained between calls.

use crate::error::BuildError;
use crate::exporter::{
    es_uri_option, ExporterCommand, ExporterFlagSet, EXPORTER_METRICS_PORT, PASSWORD_ENV_VAR,
};
use crate::image::{ImageResolver, Product};
use crate::instance::ElasticsearchInstance;
use crate::labels::{self, Identity};
use crate::naming::{self, EXPORTER_CONTAINER_NAME, EXPORTER_USER_NAME};
use crate::observability::{BuilderMetrics, StructuredLogger};
use crate::version::StackVersion;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, DeploymentStrategy};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, EnvVarSource, ExecAction, HTTPGetAction, Lifecycle,
    LifecycleHandler, PodSpec, PodTemplateSpec, Probe, ResourceRequirements, SecretKeySelector,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;
use tracing::debug;

/// Exporter release used when the image is resolved through the registry
pub const DEFAULT_EXPORTER_VERSION: &str = "v1.3.0";

/// Upstream exporter image
pub const DEFAULT_EXPORTER_IMAGE: &str = "quay.io/prometheuscommunity/elasticsearch-exporter:v1.3.0";

pub const METRICS_PORT_NAME: &str = "http";
pub const HEALTH_PATH: &str = "/healthz";

pub const CPU_REQUEST: &str = "100m";
pub const CPU_LIMIT: &str = "200m";
pub const MEMORY_REQUEST: &str = "128Mi";
pub const MEMORY_LIMIT: &str = "256Mi";

/// Seconds the container keeps serving before termination
pub const PRE_STOP_GRACE_SECONDS: u32 = 20;

/// Timings for one HTTP probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimings {
    pub initial_delay_seconds: i32,
    pub timeout_seconds: i32,
    pub period_seconds: i32,
}

pub const LIVENESS_PROBE: ProbeTimings = ProbeTimings {
    initial_delay_seconds: 5,
    timeout_seconds: 5,
    period_seconds: 5,
};

pub const READINESS_PROBE: ProbeTimings = ProbeTimings {
    initial_delay_seconds: 1,
    timeout_seconds: 5,
    period_seconds: 5,
};

/// Where the exporter image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExporterImage {
    /// Fully-qualified reference used verbatim
    Override(String),
    /// Resolved through the registry configuration at this tag, without
    /// the registry-wide suffix
    Resolved { version: String },
}

impl Default for ExporterImage {
    fn default() -> Self {
        ExporterImage::Override(DEFAULT_EXPORTER_IMAGE.to_string())
    }
}

/// Builds exporter deployments from the frozen startup configuration
#[derive(Clone)]
pub struct WorkloadBuilder {
    resolver: ImageResolver,
    flags: ExporterFlagSet,
    image: String,
    metrics: BuilderMetrics,
    logger: StructuredLogger,
}

impl WorkloadBuilder {
    pub fn new(resolver: ImageResolver, flags: ExporterFlagSet, image: ExporterImage) -> Self {
        let metrics = BuilderMetrics::new();
        let product = Product::ElasticsearchExporter;
        let image = match image {
            ExporterImage::Override(reference) => reference,
            ExporterImage::Resolved { version } => {
                metrics.inc_image_resolutions(product.name());
                resolver.resolve_product(product, &version)
            }
        };

        Self {
            resolver,
            flags,
            image,
            metrics,
            logger: StructuredLogger::new("workload-builder"),
        }
    }

    pub fn resolver(&self) -> &ImageResolver {
        &self.resolver
    }

    pub fn flags(&self) -> &ExporterFlagSet {
        &self.flags
    }

    /// Image reference every exporter container runs
    pub fn exporter_image(&self) -> &str {
        &self.image
    }

    /// Render the exporter Deployment for an instance
    ///
    /// Fails only when the instance version cannot be parsed, in which case
    /// nothing is returned.
    pub fn build_deployment(&self, es: &ElasticsearchInstance) -> Result<Deployment, BuildError> {
        let version = match StackVersion::parse(&es.version) {
            Ok(version) => version,
            Err(source) => {
                self.metrics.inc_build_errors();
                self.logger
                    .log_build_failed(&es.name, &es.namespace, &source.to_string());
                return Err(BuildError::InvalidVersion {
                    instance: format!("{}/{}", es.namespace, es.name),
                    source,
                });
            }
        };

        let name = naming::exporter_deployment_name(&es.name);
        let identity = Identity {
            namespace: &es.namespace,
            name: &es.name,
        };
        let labels = labels::deployment_labels(&identity, &name, &version);
        let selector = labels::selector_for(&identity, &name);

        let deployment = Deployment {
            metadata: ObjectMeta {
                name: Some(name.clone()),
                namespace: Some(es.namespace.clone()),
                labels: Some(labels.clone()),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(1),
                selector,
                strategy: Some(DeploymentStrategy::default()),
                template: self.pod_template(es, labels),
                ..Default::default()
            }),
            ..Default::default()
        };

        self.metrics.inc_workloads_built();
        self.logger
            .log_workload_built(&es.name, &es.namespace, &name, &self.image);

        Ok(deployment)
    }

    /// Exporter command line for an instance
    pub fn command(&self, es: &ElasticsearchInstance) -> Vec<String> {
        let host = naming::internal_service_host(&es.name, &es.namespace);
        let uri = es_uri_option(es.protocol(), EXPORTER_USER_NAME, &host);
        debug!(instance = %es.name, host = %host, "Resolved exporter URI");
        ExporterCommand::new(&self.flags).render(uri)
    }

    fn pod_template(
        &self,
        es: &ElasticsearchInstance,
        labels: BTreeMap<String, String>,
    ) -> PodTemplateSpec {
        PodTemplateSpec {
            metadata: Some(ObjectMeta {
                name: Some(EXPORTER_CONTAINER_NAME.to_string()),
                namespace: Some(es.namespace.clone()),
                labels: Some(labels),
                ..Default::default()
            }),
            spec: Some(PodSpec {
                containers: vec![self.container(es)],
                ..Default::default()
            }),
        }
    }

    fn container(&self, es: &ElasticsearchInstance) -> Container {
        Container {
            name: EXPORTER_CONTAINER_NAME.to_string(),
            image: Some(self.image.clone()),
            command: Some(self.command(es)),
            env: Some(vec![EnvVar {
                name: PASSWORD_ENV_VAR.to_string(),
                value_from: Some(EnvVarSource {
                    secret_key_ref: Some(SecretKeySelector {
                        name: Some(naming::exporter_user_secret_name(&es.name)),
                        key: EXPORTER_USER_NAME.to_string(),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            resources: Some(resource_requirements()),
            ports: Some(vec![ContainerPort {
                name: Some(METRICS_PORT_NAME.to_string()),
                container_port: EXPORTER_METRICS_PORT,
                ..Default::default()
            }]),
            liveness_probe: Some(health_probe(LIVENESS_PROBE)),
            readiness_probe: Some(health_probe(READINESS_PROBE)),
            lifecycle: Some(Lifecycle {
                pre_stop: Some(LifecycleHandler {
                    exec: Some(ExecAction {
                        command: Some(vec![
                            "/bin/ash".to_string(),
                            "-c".to_string(),
                            format!("sleep {}", PRE_STOP_GRACE_SECONDS),
                        ]),
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

fn resource_requirements() -> ResourceRequirements {
    let mut limits = BTreeMap::new();
    limits.insert("cpu".to_string(), Quantity(CPU_LIMIT.to_string()));
    limits.insert("memory".to_string(), Quantity(MEMORY_LIMIT.to_string()));

    let mut requests = BTreeMap::new();
    requests.insert("cpu".to_string(), Quantity(CPU_REQUEST.to_string()));
    requests.insert("memory".to_string(), Quantity(MEMORY_REQUEST.to_string()));

    ResourceRequirements {
        limits: Some(limits),
        requests: Some(requests),
        ..Default::default()
    }
}

fn health_probe(timings: ProbeTimings) -> Probe {
    Probe {
        http_get: Some(HTTPGetAction {
            path: Some(HEALTH_PATH.to_string()),
            port: IntOrString::String(METRICS_PORT_NAME.to_string()),
            ..Default::default()
        }),
        initial_delay_seconds: Some(timings.initial_delay_seconds),
        timeout_seconds: Some(timings.timeout_seconds),
        period_seconds: Some(timings.period_seconds),
        ..Default::default()
    }
}
