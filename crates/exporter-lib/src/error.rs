//! Error types for workload building and settings validation

use thiserror::Error;

/// Failure to parse a stack version string such as `8.1.0`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("version string is empty")]
    Empty,

    #[error("version {input:?} is missing the {component} component")]
    MissingComponent {
        input: String,
        component: &'static str,
    },

    #[error("version {input:?} has an invalid {component} component {value:?}")]
    InvalidComponent {
        input: String,
        component: &'static str,
        value: String,
    },
}

/// Failure to build an exporter workload
///
/// An unparsable instance version is the only input the builder rejects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("invalid version for {instance}: {source}")]
    InvalidVersion {
        instance: String,
        #[source]
        source: VersionParseError,
    },
}

/// Startup configuration rejected before any component is built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("unknown exporter flag {0:?}")]
    UnknownExporterFlag(String),
}
