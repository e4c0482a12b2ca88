//! Operator configuration loading

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use exporter_lib::OperatorSettings;
use std::path::Path;

/// Environment prefix, e.g. `ECK_EXPORTER_CONTAINER_REGISTRY`
const ENV_PREFIX: &str = "ECK_EXPORTER";

/// Load settings from an optional file, overridden by environment variables
///
/// Nested keys use `__`, e.g. `ECK_EXPORTER_EXPORTER__FLAGS=shards,snapshots`.
pub fn load(path: Option<&Path>) -> Result<OperatorSettings> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("exporter.flags")
                .try_parsing(true),
        )
        .build()
        .context("Failed to load operator configuration")?;

    config
        .try_deserialize()
        .context("Failed to parse operator configuration")
}
