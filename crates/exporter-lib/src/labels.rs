//! Labels and selectors for exporter deployments

use crate::version::StackVersion;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use std::collections::BTreeMap;

pub const TYPE_LABEL: &str = "common.k8s.elastic.co/type";
pub const CLUSTER_NAME_LABEL: &str = "elasticsearch.k8s.elastic.co/cluster-name";
pub const EXPORTER_DEPLOYMENT_LABEL: &str = "elasticsearch.k8s.elastic.co/exporter-deployment";
pub const VERSION_LABEL: &str = "elasticsearch.k8s.elastic.co/version";

pub const EXPORTER_TYPE: &str = "elasticsearch-exporter";

/// Namespace and name of the owning Elasticsearch resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity<'a> {
    pub namespace: &'a str,
    pub name: &'a str,
}

/// Labels that select the exporter pods; stable across version upgrades
pub fn selector_labels(identity: &Identity<'_>, deployment_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (TYPE_LABEL.to_string(), EXPORTER_TYPE.to_string()),
        (CLUSTER_NAME_LABEL.to_string(), identity.name.to_string()),
        (
            EXPORTER_DEPLOYMENT_LABEL.to_string(),
            deployment_name.to_string(),
        ),
    ])
}

/// Selector labels plus the version label
pub fn deployment_labels(
    identity: &Identity<'_>,
    deployment_name: &str,
    version: &StackVersion,
) -> BTreeMap<String, String> {
    let mut labels = selector_labels(identity, deployment_name);
    labels.insert(VERSION_LABEL.to_string(), version.to_string());
    labels
}

pub fn selector_for(identity: &Identity<'_>, deployment_name: &str) -> LabelSelector {
    LabelSelector {
        match_labels: Some(selector_labels(identity, deployment_name)),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_is_subset_of_labels() {
        let identity = Identity {
            namespace: "ns1",
            name: "es1",
        };
        let version = StackVersion::parse("8.1.0").unwrap();
        let labels = deployment_labels(&identity, "es1-es-exporter", &version);
        let selector = selector_for(&identity, "es1-es-exporter");

        let match_labels = selector.match_labels.unwrap();
        assert!(match_labels
            .iter()
            .all(|(k, v)| labels.get(k) == Some(v)));
        assert!(!match_labels.contains_key(VERSION_LABEL));
        assert_eq!(labels[VERSION_LABEL], "8.1.0");
    }
}
