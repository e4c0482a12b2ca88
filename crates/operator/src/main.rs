//! Elasticsearch exporter renderer
//!
//! Loads the startup configuration once, then renders either a stack image
//! reference or the exporter Deployment for an Elasticsearch instance.
//! Output goes to stdout as JSON; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use exporter_lib::{ElasticsearchInstance, Product, StructuredLogger};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

/// Elasticsearch exporter renderer
#[derive(Parser)]
#[command(name = "eck-exporter")]
#[command(author, version, about = "Render Elasticsearch exporter workloads", long_about = None)]
pub struct Cli {
    /// Settings file (JSON, YAML or TOML), overridden by ECK_EXPORTER_* variables
    #[arg(long, env = "ECK_EXPORTER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the fully-qualified image reference of a stack product
    Image {
        /// Product, e.g. elasticsearch, kibana, elastic-agent
        #[arg(value_parser = parse_product)]
        product: Product,

        /// Image tag
        version: String,
    },

    /// Render the exporter Deployment for an Elasticsearch instance
    Deployment {
        /// JSON file with name, namespace, version and httpTlsEnabled
        #[arg(long, conflicts_with = "name")]
        instance: Option<PathBuf>,

        /// Elasticsearch resource name
        #[arg(long, requires_all = ["namespace", "es_version"])]
        name: Option<String>,

        /// Elasticsearch resource namespace
        #[arg(long)]
        namespace: Option<String>,

        /// Elasticsearch version
        #[arg(long = "es-version")]
        es_version: Option<String>,

        /// Serve the exporter over plain HTTP
        #[arg(long)]
        no_tls: bool,
    },
}

fn parse_product(value: &str) -> Result<Product, String> {
    Product::ALL
        .iter()
        .copied()
        .find(|product| product.name() == value)
        .ok_or_else(|| {
            let known: Vec<&str> = Product::ALL.iter().map(|p| p.name()).collect();
            format!("unknown product {:?}, expected one of {}", value, known.join(", "))
        })
}

fn read_instance(
    instance: Option<PathBuf>,
    name: Option<String>,
    namespace: Option<String>,
    es_version: Option<String>,
    no_tls: bool,
) -> Result<ElasticsearchInstance> {
    if let Some(path) = instance {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read instance file {}", path.display()))?;
        return serde_json::from_str(&content).context("Failed to parse instance file");
    }

    match (name, namespace, es_version) {
        (Some(name), Some(namespace), Some(version)) => {
            Ok(ElasticsearchInstance::new(name, namespace, version).with_http_tls(!no_tls))
        }
        _ => anyhow::bail!("either --instance or --name, --namespace and --es-version are required"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();

    // Startup phase: everything below reads the frozen configuration
    let settings = config::load(cli.config.as_deref())?;
    let builder = settings
        .workload_builder()
        .context("Invalid exporter configuration")?;

    let logger = StructuredLogger::new("eck-exporter");
    logger.log_configured(builder.resolver().config(), builder.flags());

    match cli.command {
        Commands::Image { product, version } => {
            let reference = builder.resolver().resolve_product(product, &version);
            info!(product = product.name(), reference = %reference, "Resolved image");
            println!("{}", reference);
        }
        Commands::Deployment {
            instance,
            name,
            namespace,
            es_version,
            no_tls,
        } => {
            let es = read_instance(instance, name, namespace, es_version, no_tls)?;
            let deployment = builder.build_deployment(&es)?;
            let rendered = serde_json::to_string_pretty(&deployment)
                .context("Failed to serialize deployment")?;
            println!("{}", rendered);
        }
    }

    Ok(())
}
