//! Core data models for the application exporter

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// API group of the Application resource
pub const APPLICATION_GROUP: &str = "app.k8s.io";

/// API version of the Application resource
pub const APPLICATION_VERSION: &str = "v1beta1";

/// Kind reported as `owner_kind` on every ownership sample
pub const APPLICATION_KIND: &str = "Application";

/// Fully qualified group/version/kind string, used in log fields
pub fn application_gvk() -> String {
    format!(
        "{}/{}, Kind={}",
        APPLICATION_GROUP, APPLICATION_VERSION, APPLICATION_KIND
    )
}

/// An Application as seen by the exporter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub namespace: String,
    pub name: String,
    /// `spec.selector.matchLabels`
    pub match_labels: BTreeMap<String, String>,
}

impl Application {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        match_labels: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            match_labels: match_labels
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A Pod reduced to the fields the exporter reports on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodInfo {
    pub namespace: String,
    pub name: String,
    /// Container names in spec order
    pub containers: Vec<String>,
}

impl PodInfo {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        containers: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            containers: containers.into_iter().map(Into::into).collect(),
        }
    }
}

/// Summary of a single collect pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeReport {
    /// Applications returned by the store
    pub applications: usize,
    /// Ownership samples forwarded to the sink
    pub ownership_samples: usize,
    /// Display string of the store failure that aborted the scrape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScrapeReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
