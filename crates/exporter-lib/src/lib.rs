//! Application ownership exporter library
//!
//! This crate provides the core functionality for:
//! - Listing Applications and the Pods they select
//! - Publishing `kube_pod_owner` and `exporter_last_scrape_error` samples
//! - Health checks and self-observability

pub mod api;
pub mod error;
pub mod exporter;
pub mod health;
pub mod models;
pub mod observability;
pub mod selector;
pub mod sink;
pub mod store;

pub use error::{MetricError, StoreError};
pub use exporter::{AppExporter, ExporterOptions};
pub use health::{ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse};
pub use models::*;
pub use observability::{ExporterMetrics, ScrapeLogger, StructuredLogger};
pub use selector::LabelSelector;
pub use sink::{ConstMetric, MetricSink, ScrapeBuffer, ValueType};
pub use store::{KubeStore, ResourceStore};
