//! Constant metric samples and the sinks that receive them
//!
//! A [`ConstMetric`] is a single labelled value built on every scrape from a
//! [`Desc`]. Samples are handed to a [`MetricSink`]; the HTTP endpoint uses a
//! [`ScrapeBuffer`] that groups them into Prometheus metric families, tests
//! simply collect them into a `Vec`.

use crate::error::MetricError;
use prometheus::core::Desc;
use prometheus::proto::{self, LabelPair, MetricFamily, MetricType};

/// Prometheus value type of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Counter,
    Gauge,
}

impl ValueType {
    fn metric_type(self) -> MetricType {
        match self {
            ValueType::Counter => MetricType::COUNTER,
            ValueType::Gauge => MetricType::GAUGE,
        }
    }
}

/// A sample whose value is fixed at construction time
#[derive(Debug, Clone)]
pub struct ConstMetric {
    desc: Desc,
    value_type: ValueType,
    value: f64,
    label_values: Vec<String>,
}

impl ConstMetric {
    /// Build a sample; `label_values` must line up with the descriptor's
    /// variable labels in count and order.
    pub fn new(
        desc: &Desc,
        value_type: ValueType,
        value: f64,
        label_values: Vec<String>,
    ) -> Result<Self, MetricError> {
        if label_values.len() != desc.variable_labels.len() {
            return Err(MetricError::InconsistentCardinality {
                metric: desc.fq_name.clone(),
                expected: desc.variable_labels.len(),
                got: label_values.len(),
            });
        }

        Ok(Self {
            desc: desc.clone(),
            value_type,
            value,
            label_values,
        })
    }

    pub fn name(&self) -> &str {
        &self.desc.fq_name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Variable label values in declaration order
    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Look up a label value by name, constant labels included
    pub fn label(&self, name: &str) -> Option<&str> {
        self.desc
            .variable_labels
            .iter()
            .position(|l| l == name)
            .map(|i| self.label_values[i].as_str())
            .or_else(|| {
                self.desc
                    .const_label_pairs
                    .iter()
                    .find(|p| p.get_name() == name)
                    .map(|p| p.get_value())
            })
    }

    /// Protobuf form with constant and variable labels merged and sorted by
    /// name
    pub fn to_proto(&self) -> proto::Metric {
        let mut labels: Vec<LabelPair> = self.desc.const_label_pairs.clone();
        for (name, value) in self.desc.variable_labels.iter().zip(&self.label_values) {
            let mut pair = LabelPair::default();
            pair.set_name(name.clone());
            pair.set_value(value.clone());
            labels.push(pair);
        }
        labels.sort_by(|a, b| a.get_name().cmp(b.get_name()));

        let mut metric = proto::Metric::default();
        for pair in labels {
            metric.mut_label().push(pair);
        }

        match self.value_type {
            ValueType::Counter => {
                let mut counter = proto::Counter::default();
                counter.set_value(self.value);
                metric.set_counter(counter);
            }
            ValueType::Gauge => {
                let mut gauge = proto::Gauge::default();
                gauge.set_value(self.value);
                metric.set_gauge(gauge);
            }
        }

        metric
    }
}

/// Receiver of samples produced during a scrape
pub trait MetricSink: Send {
    fn send(&mut self, metric: ConstMetric);
}

impl MetricSink for Vec<ConstMetric> {
    fn send(&mut self, metric: ConstMetric) {
        self.push(metric);
    }
}

/// Sink that groups samples into metric families for exposition
#[derive(Debug, Default)]
pub struct ScrapeBuffer {
    families: Vec<MetricFamily>,
}

impl ScrapeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Families in first-seen order; every family holds at least one metric
    pub fn into_families(self) -> Vec<MetricFamily> {
        self.families
    }
}

impl MetricSink for ScrapeBuffer {
    fn send(&mut self, metric: ConstMetric) {
        let idx = match self
            .families
            .iter()
            .position(|f| f.get_name() == metric.name())
        {
            Some(idx) => idx,
            None => {
                let mut family = MetricFamily::default();
                family.set_name(metric.desc.fq_name.clone());
                family.set_help(metric.desc.help.clone());
                family.set_field_type(metric.value_type.metric_type());
                self.families.push(family);
                self.families.len() - 1
            }
        };

        self.families[idx].mut_metric().push(metric.to_proto());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn owner_desc(const_labels: HashMap<String, String>) -> Desc {
        Desc::new(
            "kube_pod_owner".to_string(),
            "kube pod owner".to_string(),
            vec!["pod".to_string(), "container".to_string()],
            const_labels,
        )
        .unwrap()
    }

    #[test]
    fn test_label_cardinality_checked() {
        let desc = owner_desc(HashMap::new());

        let err = ConstMetric::new(&desc, ValueType::Counter, 1.0, vec!["web-0".to_string()])
            .unwrap_err();
        assert!(matches!(
            err,
            MetricError::InconsistentCardinality {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_proto_labels_sorted_and_merged() {
        let desc = owner_desc(HashMap::from([("cluster".to_string(), "prod".to_string())]));
        let metric = ConstMetric::new(
            &desc,
            ValueType::Counter,
            1.0,
            vec!["web-0".to_string(), "main".to_string()],
        )
        .unwrap();

        let proto = metric.to_proto();
        let names: Vec<&str> = proto.get_label().iter().map(|l| l.get_name()).collect();
        assert_eq!(names, vec!["cluster", "container", "pod"]);
        assert_eq!(proto.get_counter().get_value(), 1.0);

        assert_eq!(metric.label("pod"), Some("web-0"));
        assert_eq!(metric.label("cluster"), Some("prod"));
        assert_eq!(metric.label("missing"), None);
    }

    #[test]
    fn test_scrape_buffer_groups_by_family() {
        let owner = owner_desc(HashMap::new());
        let error = Desc::new(
            "exporter_last_scrape_error".to_string(),
            "The last scrape error status.".to_string(),
            vec!["err".to_string()],
            HashMap::new(),
        )
        .unwrap();

        let mut buffer = ScrapeBuffer::new();
        assert!(buffer.is_empty());
        for container in ["main", "sidecar"] {
            buffer.send(
                ConstMetric::new(
                    &owner,
                    ValueType::Counter,
                    1.0,
                    vec!["web-0".to_string(), container.to_string()],
                )
                .unwrap(),
            );
        }
        buffer.send(
            ConstMetric::new(&error, ValueType::Gauge, 1.0, vec!["boom".to_string()]).unwrap(),
        );

        let families = buffer.into_families();
        assert_eq!(families.len(), 2);
        assert_eq!(families[0].get_name(), "kube_pod_owner");
        assert_eq!(families[0].get_field_type(), MetricType::COUNTER);
        assert_eq!(families[0].get_metric().len(), 2);
        assert_eq!(families[1].get_name(), "exporter_last_scrape_error");
        assert_eq!(families[1].get_field_type(), MetricType::GAUGE);
        assert_eq!(families[1].get_metric()[0].get_gauge().get_value(), 1.0);
    }
}
