//! Operator settings
//!
//! Deserialized once at startup and turned into the immutable resolver,
//! flag set and builder. Every field has a default so partial sources work.

use crate::error::SettingsError;
use crate::exporter::{ExporterFlag, ExporterFlagSet};
use crate::image::{ImageNamespace, ImageResolver, RegistryConfig, DEFAULT_CONTAINER_REGISTRY};
use crate::workload::{
    ExporterImage, WorkloadBuilder, DEFAULT_EXPORTER_IMAGE, DEFAULT_EXPORTER_VERSION,
};
use serde::Deserialize;

/// Startup settings for image resolution and the exporter
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorSettings {
    #[serde(default = "default_container_registry")]
    pub container_registry: String,

    /// Appended to every image name, e.g. `-ubi8`
    #[serde(default)]
    pub container_suffix: String,

    #[serde(default)]
    pub namespaces: NamespaceSettings,

    #[serde(default)]
    pub exporter: ExporterSettings,
}

fn default_container_registry() -> String {
    DEFAULT_CONTAINER_REGISTRY.to_string()
}

impl Default for OperatorSettings {
    fn default() -> Self {
        Self {
            container_registry: default_container_registry(),
            container_suffix: String::new(),
            namespaces: NamespaceSettings::default(),
            exporter: ExporterSettings::default(),
        }
    }
}

/// Namespace per image group
#[derive(Debug, Clone, Deserialize)]
pub struct NamespaceSettings {
    #[serde(default = "default_apm")]
    pub apm: String,
    #[serde(default = "default_elasticsearch")]
    pub elasticsearch: String,
    #[serde(default = "default_kibana")]
    pub kibana: String,
    #[serde(default = "default_enterprise_search")]
    pub enterprise_search: String,
    #[serde(default = "default_beats")]
    pub beats: String,
    #[serde(default = "default_maps")]
    pub maps: String,
    #[serde(default = "default_exporter")]
    pub exporter: String,
}

fn default_apm() -> String {
    ImageNamespace::Apm.default_value().to_string()
}

fn default_elasticsearch() -> String {
    ImageNamespace::Elasticsearch.default_value().to_string()
}

fn default_kibana() -> String {
    ImageNamespace::Kibana.default_value().to_string()
}

fn default_enterprise_search() -> String {
    ImageNamespace::EnterpriseSearch.default_value().to_string()
}

fn default_beats() -> String {
    ImageNamespace::Beats.default_value().to_string()
}

fn default_maps() -> String {
    ImageNamespace::Maps.default_value().to_string()
}

fn default_exporter() -> String {
    ImageNamespace::Exporter.default_value().to_string()
}

impl Default for NamespaceSettings {
    fn default() -> Self {
        Self {
            apm: default_apm(),
            elasticsearch: default_elasticsearch(),
            kibana: default_kibana(),
            enterprise_search: default_enterprise_search(),
            beats: default_beats(),
            maps: default_maps(),
            exporter: default_exporter(),
        }
    }
}

impl NamespaceSettings {
    pub fn get(&self, group: ImageNamespace) -> &str {
        match group {
            ImageNamespace::Apm => &self.apm,
            ImageNamespace::Elasticsearch => &self.elasticsearch,
            ImageNamespace::Kibana => &self.kibana,
            ImageNamespace::EnterpriseSearch => &self.enterprise_search,
            ImageNamespace::Beats => &self.beats,
            ImageNamespace::Maps => &self.maps,
            ImageNamespace::Exporter => &self.exporter,
        }
    }
}

/// Exporter image and metrics collectors
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterSettings {
    /// Fully-qualified image, used unless `resolve_from_registry` is set
    #[serde(default = "default_exporter_image")]
    pub image: String,

    /// Pull the exporter from `container_registry` instead, e.g. a mirror
    #[serde(default)]
    pub resolve_from_registry: bool,

    /// Tag used when resolving from the registry
    #[serde(default = "default_exporter_version")]
    pub version: String,

    /// Flag identifiers such as `shards` or `indices-settings`
    #[serde(default)]
    pub flags: Vec<String>,
}

fn default_exporter_image() -> String {
    DEFAULT_EXPORTER_IMAGE.to_string()
}

fn default_exporter_version() -> String {
    DEFAULT_EXPORTER_VERSION.to_string()
}

impl Default for ExporterSettings {
    fn default() -> Self {
        Self {
            image: default_exporter_image(),
            resolve_from_registry: false,
            version: default_exporter_version(),
            flags: Vec::new(),
        }
    }
}

impl ExporterSettings {
    pub fn image(&self) -> ExporterImage {
        if self.resolve_from_registry {
            ExporterImage::Resolved {
                version: self.version.clone(),
            }
        } else {
            ExporterImage::Override(self.image.clone())
        }
    }
}

impl OperatorSettings {
    pub fn registry_config(&self) -> RegistryConfig {
        ImageNamespace::ALL.iter().fold(
            RegistryConfig::builder()
                .registry(self.container_registry.as_str())
                .suffix(self.container_suffix.as_str()),
            |builder, group| builder.namespace(*group, self.namespaces.get(*group)),
        )
        .build()
    }

    /// Configured flags, rejecting identifiers outside the known set
    pub fn exporter_flags(&self) -> Result<Vec<ExporterFlag>, SettingsError> {
        self.exporter.flags.iter().map(|id| id.parse::<ExporterFlag>()).collect()
    }

    pub fn flag_set(&self) -> Result<ExporterFlagSet, SettingsError> {
        Ok(self.exporter_flags()?.into_iter().collect())
    }

    pub fn resolver(&self) -> ImageResolver {
        ImageResolver::new(self.registry_config())
    }

    /// Validate and freeze the settings into a workload builder
    pub fn workload_builder(&self) -> Result<WorkloadBuilder, SettingsError> {
        Ok(WorkloadBuilder::new(
            self.resolver(),
            self.flag_set()?,
            self.exporter.image(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Product;

    #[test]
    fn test_defaults_resolve_upstream_images() {
        let resolver = OperatorSettings::default().resolver();
        assert_eq!(
            resolver.resolve_product(Product::Maps, "8.1.0"),
            "docker.elastic.co/elastic-maps-service/elastic-maps-server-ubi8:8.1.0"
        );
        assert_eq!(
            resolver.resolve_product(Product::EnterpriseSearch, "8.1.0"),
            "docker.elastic.co/enterprise-search/enterprise-search:8.1.0"
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: OperatorSettings = serde_json::from_str(
            r#"{"container_suffix":"-ubi8","namespaces":{"beats":"mirror"},"exporter":{"flags":["shards"]}}"#,
        )
        .unwrap();
        assert_eq!(settings.container_registry, "docker.elastic.co");
        assert_eq!(settings.namespaces.beats, "mirror");
        assert_eq!(settings.namespaces.kibana, "kibana");
        assert_eq!(settings.exporter.version, "v1.3.0");
        assert_eq!(settings.exporter_flags().unwrap(), vec![ExporterFlag::Shards]);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        let settings = OperatorSettings {
            exporter: ExporterSettings {
                flags: vec!["shards".to_string(), "nodes".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            settings.flag_set().unwrap_err(),
            SettingsError::UnknownExporterFlag("nodes".to_string())
        );
        assert!(settings.workload_builder().is_err());
    }

    #[test]
    fn test_exporter_image_selection() {
        let mut settings = OperatorSettings::default();
        assert_eq!(
            settings.workload_builder().unwrap().exporter_image(),
            "quay.io/prometheuscommunity/elasticsearch-exporter:v1.3.0"
        );

        settings.container_suffix = "-ubi8".to_string();
        assert_eq!(
            settings.workload_builder().unwrap().exporter_image(),
            "quay.io/prometheuscommunity/elasticsearch-exporter:v1.3.0"
        );

        settings.exporter.image = "registry.local/exporter:1.0".to_string();
        assert_eq!(
            settings.workload_builder().unwrap().exporter_image(),
            "registry.local/exporter:1.0"
        );

        settings.container_registry = "mirror.local".to_string();
        settings.exporter.resolve_from_registry = true;
        assert_eq!(
            settings.workload_builder().unwrap().exporter_image(),
            "mirror.local/prometheuscommunity/elasticsearch-exporter:v1.3.0"
        );
    }
}
