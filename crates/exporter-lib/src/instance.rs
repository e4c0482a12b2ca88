//! Managed Elasticsearch instance descriptor

use serde::{Deserialize, Serialize};

/// The subset of an Elasticsearch resource the exporter workload depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElasticsearchInstance {
    pub name: String,
    pub namespace: String,
    /// Stack version as written on the resource, parsed at build time
    pub version: String,
    /// Self-signed or user-provided TLS on the HTTP layer
    #[serde(default = "default_http_tls_enabled")]
    pub http_tls_enabled: bool,
}

fn default_http_tls_enabled() -> bool {
    true
}

impl ElasticsearchInstance {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            version: version.into(),
            http_tls_enabled: true,
        }
    }

    pub fn with_http_tls(mut self, enabled: bool) -> Self {
        self.http_tls_enabled = enabled;
        self
    }

    /// Scheme the HTTP layer is served on
    pub fn protocol(&self) -> &'static str {
        if self.http_tls_enabled {
            "https"
        } else {
            "http"
        }
    }
}
