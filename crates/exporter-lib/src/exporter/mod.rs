//! Application ownership exporter
//!
//! On every scrape the exporter lists all Applications, lists the Pods each
//! one selects, and emits one `kube_pod_owner` sample per container. A store
//! failure anywhere aborts the scrape: nothing but a single
//! `exporter_last_scrape_error` sample reaches the sink.


use crate::error::{MetricError, StoreError};
use crate::models::{application_gvk, ScrapeReport, APPLICATION_KIND};
use crate::observability::{ScrapeLogger, StructuredLogger};
use crate::selector::LabelSelector;
use crate::sink::{ConstMetric, MetricSink, ValueType};
use crate::store::ResourceStore;
use prometheus::core::Desc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

pub const KUBE_POD_OWNER: &str = "kube_pod_owner";
pub const EXPORTER_LAST_SCRAPE_ERROR: &str = "exporter_last_scrape_error";

/// Variable labels of `kube_pod_owner`, in emission order
pub const KUBE_POD_OWNER_LABELS: [&str; 6] = [
    "container",
    "namespace",
    "owner_is_controller",
    "owner_kind",
    "owner_name",
    "pod",
];

/// Value of the `collect` log field bound for every scrape
const COLLECT_SCOPE: &str = "application";

/// Construction-time inputs of the exporter
#[derive(Clone)]
pub struct ExporterOptions {
    pub logger: StructuredLogger,
    pub store: Arc<dyn ResourceStore>,
    /// Constant labels attached to every descriptor
    pub const_labels: HashMap<String, String>,
}

/// Publishes Application → Pod ownership as Prometheus samples
pub struct AppExporter {
    options: ExporterOptions,
    kube_pod_owner: Desc,
    last_scrape_error: Desc,
}

impl AppExporter {
    /// Build the exporter; fails only if the constant labels are not valid
    /// Prometheus label names
    pub fn new(options: ExporterOptions) -> Result<Self, MetricError> {
        let kube_pod_owner = Desc::new(
            KUBE_POD_OWNER.to_string(),
            "kube pod owner".to_string(),
            KUBE_POD_OWNER_LABELS.iter().map(|l| l.to_string()).collect(),
            options.const_labels.clone(),
        )?;
        let last_scrape_error = Desc::new(
            EXPORTER_LAST_SCRAPE_ERROR.to_string(),
            "The last scrape error status.".to_string(),
            vec!["err".to_string()],
            options.const_labels.clone(),
        )?;

        Ok(Self {
            options,
            kube_pod_owner,
            last_scrape_error,
        })
    }

    /// The fixed descriptor set; never touches the store
    pub fn describe(&self) -> Vec<&Desc> {
        vec![&self.kube_pod_owner, &self.last_scrape_error]
    }

    /// Run one scrape, writing samples into `sink`
    ///
    /// Never fails: store errors are logged and turned into a single
    /// `exporter_last_scrape_error` sample.
    pub async fn collect(&self, sink: &mut dyn MetricSink) -> ScrapeReport {
        let started = Instant::now();
        let logger = self.options.logger.scrape(COLLECT_SCOPE);

        let report = match self.collect_ownership(&logger).await {
            Ok((applications, samples)) => {
                let report = ScrapeReport {
                    applications,
                    ownership_samples: samples.len(),
                    error: None,
                };
                for sample in samples {
                    sink.send(sample);
                }
                report
            }
            Err(err) => {
                let message = err.to_string();
                self.send_last_scrape_error(&logger, sink, 1.0, &message);
                ScrapeReport {
                    applications: 0,
                    ownership_samples: 0,
                    error: Some(message),
                }
            }
        };

        logger.log_scrape_complete(&report, started.elapsed());
        report
    }

    /// List Applications and their Pods, staging ownership samples until
    /// every query has succeeded
    async fn collect_ownership(
        &self,
        logger: &ScrapeLogger,
    ) -> Result<(usize, Vec<ConstMetric>), StoreError> {
        let applications = self
            .options
            .store
            .list_applications()
            .await
            .inspect_err(|err| logger.log_application_list_failed(err, &application_gvk()))?;

        let mut samples = Vec::new();
        for application in &applications {
            let selector = LabelSelector::from_labels(&application.match_labels);
            let pods = self
                .options
                .store
                .list_pods(&application.namespace, &selector)
                .await
                .inspect_err(|err| {
                    logger.log_pod_list_failed(err, &application.namespace, &application.name)
                })?;

            for pod in &pods {
                for container in &pod.containers {
                    let label_values = vec![
                        container.clone(),
                        application.namespace.clone(),
                        "true".to_string(),
                        APPLICATION_KIND.to_string(),
                        application.name.clone(),
                        pod.name.clone(),
                    ];
                    match ConstMetric::new(
                        &self.kube_pod_owner,
                        ValueType::Counter,
                        1.0,
                        label_values,
                    ) {
                        Ok(sample) => samples.push(sample),
                        Err(err) => logger.log_metric_build_failed(&err, KUBE_POD_OWNER),
                    }
                }
            }
        }

        Ok((applications.len(), samples))
    }

    /// Emit `exporter_last_scrape_error`; a construction failure is only
    /// logged
    fn send_last_scrape_error(
        &self,
        logger: &ScrapeLogger,
        sink: &mut dyn MetricSink,
        value: f64,
        message: &str,
    ) {
        match ConstMetric::new(
            &self.last_scrape_error,
            ValueType::Gauge,
            value,
            vec![message.to_string()],
        ) {
            Ok(metric) => sink.send(metric),
            Err(err) => logger.log_metric_build_failed(&err, EXPORTER_LAST_SCRAPE_ERROR),
        }
    }
}
