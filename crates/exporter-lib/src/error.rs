//! Error types for the exporter library

use thiserror::Error;

/// Failure of a resource store query
///
/// The `Display` output becomes the `err` label of
/// `exporter_last_scrape_error`, so messages stay single-line.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The Kubernetes API rejected or failed the request
    #[error("{0}")]
    Api(#[from] kube::Error),

    /// An object came back in a shape the exporter cannot read
    #[error("unable to decode {kind} {namespace}/{name}: {source}")]
    Decode {
        kind: &'static str,
        namespace: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Backend failure outside the Kubernetes client
    #[error("{0}")]
    Unavailable(String),
}

/// Failure to build a descriptor or a sample
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("inconsistent label cardinality for {metric}: expected {expected} label values but got {got}")]
    InconsistentCardinality {
        metric: String,
        expected: usize,
        got: usize,
    },

    #[error("invalid metric descriptor: {0}")]
    InvalidDescriptor(#[from] prometheus::Error),
}
