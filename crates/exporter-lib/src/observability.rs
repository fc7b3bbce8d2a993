//! Observability infrastructure for the application exporter
//!
//! Provides:
//! - Prometheus self-metrics (scrape latency, scrape outcomes, last scrape size)
//! - Structured JSON logging with tracing

use crate::models::ScrapeReport;
use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter,
    IntGauge,
};
use std::fmt::Display;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, error, info};

/// Histogram buckets for scrape latency (in seconds)
const SCRAPE_LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ExporterMetricsInner> = OnceLock::new();

struct ExporterMetricsInner {
    scrape_duration_seconds: Histogram,
    scrapes: IntCounter,
    scrape_failures: IntCounter,
    applications: IntGauge,
    ownership_samples: IntGauge,
}

impl ExporterMetricsInner {
    fn new() -> Self {
        Self {
            scrape_duration_seconds: register_histogram!(
                "app_exporter_scrape_duration_seconds",
                "Time spent listing applications and pods for one scrape",
                SCRAPE_LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register scrape_duration_seconds"),

            scrapes: register_int_counter!(
                "app_exporter_scrapes_total",
                "Total number of scrapes served"
            )
            .expect("Failed to register scrapes_total"),

            scrape_failures: register_int_counter!(
                "app_exporter_scrape_failures_total",
                "Total number of scrapes aborted by a store failure"
            )
            .expect("Failed to register scrape_failures_total"),

            applications: register_int_gauge!(
                "app_exporter_applications",
                "Applications seen by the last successful scrape"
            )
            .expect("Failed to register applications"),

            ownership_samples: register_int_gauge!(
                "app_exporter_ownership_samples",
                "Ownership samples emitted by the last successful scrape"
            )
            .expect("Failed to register ownership_samples"),
        }
    }
}

/// Exporter self-metrics
///
/// Lightweight handle to the global metrics instance; clones share the same
/// underlying metrics.
#[derive(Clone)]
pub struct ExporterMetrics {
    _private: (),
}

impl Default for ExporterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ExporterMetrics {
    /// Create a new metrics handle (registers the global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ExporterMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ExporterMetricsInner {
        GLOBAL_METRICS.get_or_init(ExporterMetricsInner::new)
    }

    /// Record the outcome of one scrape
    pub fn record_scrape(&self, report: &ScrapeReport, elapsed: Duration) {
        let inner = self.inner();
        inner.scrapes.inc();
        inner
            .scrape_duration_seconds
            .observe(elapsed.as_secs_f64());

        if report.is_success() {
            inner.applications.set(report.applications as i64);
            inner.ownership_samples.set(report.ownership_samples as i64);
        } else {
            inner.scrape_failures.inc();
        }
    }
}

/// Structured logger for exporter lifecycle events
///
/// Per-scrape logging goes through a [`ScrapeLogger`] obtained from
/// [`StructuredLogger::scrape`], which is passed explicitly to everything
/// that logs while a scrape runs.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    component: String,
}

impl StructuredLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Bind the fields of one scrape
    pub fn scrape(&self, collect: &str) -> ScrapeLogger {
        ScrapeLogger {
            component: self.component.clone(),
            collect: collect.to_string(),
        }
    }

    /// Log exporter startup
    pub fn log_startup(&self, version: &str, listen_addr: &str) {
        info!(
            event = "exporter_started",
            component = %self.component,
            exporter_version = %version,
            listen_addr = %listen_addr,
            "Application exporter started"
        );
    }

    /// Log exporter shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "exporter_shutdown",
            component = %self.component,
            reason = %reason,
            "Application exporter shutting down"
        );
    }
}

/// Logger bound to a single scrape
#[derive(Debug, Clone)]
pub struct ScrapeLogger {
    component: String,
    collect: String,
}

impl ScrapeLogger {
    pub fn collect(&self) -> &str {
        &self.collect
    }

    /// Log a failed Application list
    pub fn log_application_list_failed(&self, err: &dyn Display, gvk: &str) {
        error!(
            event = "scrape_failed",
            component = %self.component,
            collect = %self.collect,
            error = %err,
            app_gvk = %gvk,
            "Unable to list resources for GVK"
        );
    }

    /// Log a failed Pod list for one Application
    pub fn log_pod_list_failed(&self, err: &dyn Display, namespace: &str, application: &str) {
        error!(
            event = "scrape_failed",
            component = %self.component,
            collect = %self.collect,
            error = %err,
            namespace = %namespace,
            application = %application,
            "Unable to list pods for application"
        );
    }

    /// Log a sample that could not be built; nothing is emitted for it
    pub fn log_metric_build_failed(&self, err: &dyn Display, metric: &str) {
        error!(
            event = "metric_build_failed",
            component = %self.component,
            collect = %self.collect,
            error = %err,
            metric = %metric,
            "Unable to build metric sample"
        );
    }

    /// Log the summary of a finished scrape
    pub fn log_scrape_complete(&self, report: &ScrapeReport, elapsed: Duration) {
        debug!(
            event = "scrape_complete",
            component = %self.component,
            collect = %self.collect,
            applications = report.applications,
            ownership_samples = report.ownership_samples,
            success = report.is_success(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Scrape finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exporter_metrics_record() {
        let metrics = ExporterMetrics::new();

        metrics.record_scrape(
            &ScrapeReport {
                applications: 3,
                ownership_samples: 7,
                error: None,
            },
            Duration::from_millis(12),
        );
        metrics.record_scrape(
            &ScrapeReport {
                applications: 0,
                ownership_samples: 0,
                error: Some("connection refused".to_string()),
            },
            Duration::from_millis(3),
        );

        // A failed scrape leaves the last successful sizes in place
        let inner = metrics.inner();
        assert_eq!(inner.applications.get(), 3);
        assert_eq!(inner.ownership_samples.get(), 7);
        assert!(inner.scrape_failures.get() >= 1);
    }

    #[test]
    fn test_scrape_logger_binds_fields() {
        let logger = StructuredLogger::new("app-exporter");
        assert_eq!(logger.component(), "app-exporter");

        let scrape = logger.scrape("application");
        assert_eq!(scrape.collect(), "application");
        assert_eq!(scrape.component, "app-exporter");
    }
}
