//! HTTP API for health checks and Prometheus metrics

use crate::exporter::AppExporter;
use crate::health::{ComponentStatus, HealthRegistry};
use crate::observability::ExporterMetrics;
use crate::sink::{MetricSink, ScrapeBuffer};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub exporter: Arc<AppExporter>,
    pub health_registry: HealthRegistry,
    pub metrics: ExporterMetrics,
}

impl AppState {
    pub fn new(
        exporter: Arc<AppExporter>,
        health_registry: HealthRegistry,
        metrics: ExporterMetrics,
    ) -> Self {
        Self {
            exporter,
            health_registry,
            metrics,
        }
    }
}

/// Health check response - 200 unless a component is unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - 200 once initialized
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint; every request is one scrape
async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let started = Instant::now();
    let mut buffer = ScrapeBuffer::new();
    let report = state.exporter.collect(&mut buffer as &mut dyn MetricSink).await;

    state.metrics.record_scrape(&report, started.elapsed());
    state.health_registry.record_scrape(&report).await;

    let mut families = prometheus::gather();
    families.extend(buffer.into_families());

    let encoder = TextEncoder::new();
    let mut body = Vec::new();
    if let Err(e) = encoder.encode(&families, &mut body) {
        error!(error = %e, "Failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", encoder.format_type().to_string())],
        body,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
