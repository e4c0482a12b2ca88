//! Container image reference resolution
//!
//! A [`RegistryConfig`] is assembled once at startup through
//! [`RegistryConfigBuilder`] and frozen into an [`ImageResolver`], which
//! derives every product image from its namespace group exactly once.
//! Changing a namespace means building a new resolver.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default registry for Elastic stack images
pub const DEFAULT_CONTAINER_REGISTRY: &str = "docker.elastic.co";

/// An image path segment without registry or tag, e.g. `elasticsearch/elasticsearch`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Image(String);

impl Image {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Namespace groups that can be overridden independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageNamespace {
    Apm,
    Elasticsearch,
    Kibana,
    EnterpriseSearch,
    Beats,
    Maps,
    Exporter,
}

impl ImageNamespace {
    pub const ALL: [ImageNamespace; 7] = [
        ImageNamespace::Apm,
        ImageNamespace::Elasticsearch,
        ImageNamespace::Kibana,
        ImageNamespace::EnterpriseSearch,
        ImageNamespace::Beats,
        ImageNamespace::Maps,
        ImageNamespace::Exporter,
    ];

    /// Upstream namespace used when the operator is not told otherwise
    pub fn default_value(&self) -> &'static str {
        match self {
            ImageNamespace::Apm => "apm",
            ImageNamespace::Elasticsearch => "elasticsearch",
            ImageNamespace::Kibana => "kibana",
            ImageNamespace::EnterpriseSearch => "enterprise-search",
            ImageNamespace::Beats => "beats",
            ImageNamespace::Maps => "elastic-maps-service",
            ImageNamespace::Exporter => "prometheuscommunity",
        }
    }
}

/// Products with a known image
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    ApmServer,
    Elasticsearch,
    Kibana,
    EnterpriseSearch,
    Filebeat,
    Metricbeat,
    Heartbeat,
    Auditbeat,
    Journalbeat,
    Packetbeat,
    Agent,
    Maps,
    ElasticsearchExporter,
}

impl Product {
    pub const ALL: [Product; 13] = [
        Product::ApmServer,
        Product::Elasticsearch,
        Product::Kibana,
        Product::EnterpriseSearch,
        Product::Filebeat,
        Product::Metricbeat,
        Product::Heartbeat,
        Product::Auditbeat,
        Product::Journalbeat,
        Product::Packetbeat,
        Product::Agent,
        Product::Maps,
        Product::ElasticsearchExporter,
    ];

    pub fn name(&self) -> &'static str {
        self.image_suffix().trim_start_matches('/')
    }

    pub fn namespace(&self) -> ImageNamespace {
        match self {
            Product::ApmServer => ImageNamespace::Apm,
            Product::Elasticsearch => ImageNamespace::Elasticsearch,
            Product::Kibana => ImageNamespace::Kibana,
            Product::EnterpriseSearch => ImageNamespace::EnterpriseSearch,
            Product::Filebeat
            | Product::Metricbeat
            | Product::Heartbeat
            | Product::Auditbeat
            | Product::Journalbeat
            | Product::Packetbeat
            | Product::Agent => ImageNamespace::Beats,
            Product::Maps => ImageNamespace::Maps,
            Product::ElasticsearchExporter => ImageNamespace::Exporter,
        }
    }

    /// Whether the registry-wide suffix applies; the exporter is not an Elastic image
    pub fn takes_suffix(&self) -> bool {
        !matches!(self, Product::ElasticsearchExporter)
    }

    /// Fixed path appended to the namespace
    pub fn image_suffix(&self) -> &'static str {
        match self {
            Product::ApmServer => "/apm-server",
            Product::Elasticsearch => "/elasticsearch",
            Product::Kibana => "/kibana",
            Product::EnterpriseSearch => "/enterprise-search",
            Product::Filebeat => "/filebeat",
            Product::Metricbeat => "/metricbeat",
            Product::Heartbeat => "/heartbeat",
            Product::Auditbeat => "/auditbeat",
            Product::Journalbeat => "/journalbeat",
            Product::Packetbeat => "/packetbeat",
            Product::Agent => "/elastic-agent",
            Product::Maps => "/elastic-maps-server-ubi8",
            Product::ElasticsearchExporter => "/elasticsearch-exporter",
        }
    }
}

/// Registry, suffix and namespace overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub registry: String,
    pub suffix: String,
    pub namespaces: BTreeMap<ImageNamespace, String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            registry: DEFAULT_CONTAINER_REGISTRY.to_string(),
            suffix: String::new(),
            namespaces: BTreeMap::new(),
        }
    }
}

impl RegistryConfig {
    pub fn builder() -> RegistryConfigBuilder {
        RegistryConfigBuilder::default()
    }

    /// Namespace for a group, empty when never set
    pub fn namespace(&self, group: ImageNamespace) -> &str {
        self.namespaces.get(&group).map_or("", String::as_str)
    }
}

/// Startup-phase setters for [`RegistryConfig`]
///
/// No validation is performed and the last write wins.
#[derive(Debug, Default)]
pub struct RegistryConfigBuilder {
    config: RegistryConfig,
}

impl RegistryConfigBuilder {
    pub fn registry(mut self, host: impl Into<String>) -> Self {
        self.config.registry = host.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.suffix = suffix.into();
        self
    }

    pub fn namespace(mut self, group: ImageNamespace, namespace: impl Into<String>) -> Self {
        self.config.namespaces.insert(group, namespace.into());
        self
    }

    pub fn build(self) -> RegistryConfig {
        self.config
    }
}

/// Resolves product images to fully-qualified references
#[derive(Debug, Clone)]
pub struct ImageResolver {
    config: RegistryConfig,
    images: BTreeMap<Product, Image>,
}

impl ImageResolver {
    pub fn new(config: RegistryConfig) -> Self {
        let images = Product::ALL
            .iter()
            .map(|product| {
                let path = format!(
                    "{}{}",
                    config.namespace(product.namespace()),
                    product.image_suffix()
                );
                (*product, Image::new(path))
            })
            .collect();

        Self { config, images }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Image path derived for a product when the resolver was built
    pub fn image(&self, product: Product) -> &Image {
        // every product is inserted in `new`
        &self.images[&product]
    }

    /// Full reference `{registry}/{image}{suffix}:{version}`
    ///
    /// The suffix is skipped when the image already ends with it. Neither
    /// the registry nor the version is validated.
    pub fn resolve(&self, image: &Image, version: &str) -> String {
        let suffix = self.config.suffix.as_str();
        if image.as_str().ends_with(suffix) {
            format!("{}/{}:{}", self.config.registry, image, version)
        } else {
            format!("{}/{}{}:{}", self.config.registry, image, suffix, version)
        }
    }

    pub fn resolve_product(&self, product: Product, version: &str) -> String {
        let image = self.image(product);
        if product.takes_suffix() {
            self.resolve(image, version)
        } else {
            format!("{}/{}:{}", self.config.registry, image, version)
        }
    }
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
