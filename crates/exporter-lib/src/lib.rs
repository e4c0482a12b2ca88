//! Elasticsearch exporter workload library
//!
//! This crate provides:
//! - Fully-qualified image reference resolution for Elastic stack products
//! - Exporter feature flags and command line synthesis
//! - Rendering of the exporter sidecar Deployment for a managed instance
//! - Startup settings, structured logging and metrics

pub mod error;
pub mod exporter;
pub mod image;
pub mod instance;
pub mod labels;
pub mod naming;
pub mod observability;
pub mod settings;
pub mod version;
pub mod workload;

pub use error::{BuildError, SettingsError, VersionParseError};
pub use exporter::{ExporterCommand, ExporterFlag, ExporterFlagSet};
pub use image::{Image, ImageNamespace, ImageResolver, Product, RegistryConfig};
pub use instance::ElasticsearchInstance;
pub use observability::{BuilderMetrics, StructuredLogger};
pub use settings::OperatorSettings;
pub use version::StackVersion;
pub use workload::{ExporterImage, WorkloadBuilder};
