//! Application exporter - publishes Application → Pod ownership metrics
//!
//! Runs as a Deployment in the cluster; Prometheus scrapes `/metrics`, and
//! every scrape lists Applications and their Pods through the Kubernetes API.

use anyhow::{Context, Result};
use exporter_lib::{
    api,
    health::{components, HealthRegistry},
    AppExporter, ExporterMetrics, ExporterOptions, KubeStore, StructuredLogger,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

const EXPORTER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting app-exporter");

    let config = config::ExporterConfig::load()?;
    let const_labels = config.const_labels()?;
    info!(
        listen_port = config.listen_port,
        const_labels = const_labels.len(),
        "Exporter configured"
    );

    let client = kube::Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let logger = StructuredLogger::new("app-exporter");
    let exporter = AppExporter::new(ExporterOptions {
        logger: logger.clone(),
        store: Arc::new(KubeStore::new(client)),
        const_labels,
    })
    .context("Invalid constant labels")?;

    let health_registry = HealthRegistry::new();
    health_registry.register(components::RESOURCE_STORE).await;
    health_registry.register(components::HTTP_SERVER).await;

    let app_state = Arc::new(api::AppState::new(
        Arc::new(exporter),
        health_registry.clone(),
        ExporterMetrics::new(),
    ));

    health_registry.set_ready(true).await;
    logger.log_startup(EXPORTER_VERSION, &format!("0.0.0.0:{}", config.listen_port));

    tokio::select! {
        result = api::serve(config.listen_port, app_state) => {
            result.context("API server failed")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
