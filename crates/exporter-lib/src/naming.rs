//! Resource naming conventions shared with the Elasticsearch controller

/// Account the exporter authenticates as; also the key in its secret
pub const EXPORTER_USER_NAME: &str = "elastic-internal-exporter";

/// Name of the exporter container and its pod template
pub const EXPORTER_CONTAINER_NAME: &str = "elasticsearch-exporter";

pub fn exporter_deployment_name(es_name: &str) -> String {
    format!("{}-es-exporter", es_name)
}

/// Secret holding the exporter user's password
pub fn exporter_user_secret_name(es_name: &str) -> String {
    format!("{}-es-exporter-user", es_name)
}

pub fn internal_service_name(es_name: &str) -> String {
    format!("{}-es-internal-http", es_name)
}

/// Cluster-local host of the internal HTTP service
pub fn internal_service_host(es_name: &str, namespace: &str) -> String {
    format!("{}.{}.svc", internal_service_name(es_name), namespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(exporter_deployment_name("es1"), "es1-es-exporter");
        assert_eq!(exporter_user_secret_name("es1"), "es1-es-exporter-user");
        assert_eq!(internal_service_host("es1", "ns1"), "es1-es-internal-http.ns1.svc");
    }
}
