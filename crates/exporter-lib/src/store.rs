//! Resource store access
//!
//! The exporter only ever lists two kinds of objects: Applications across the
//! whole cluster, and Pods of one namespace filtered by a label selector.
//! [`ResourceStore`] captures that contract; [`KubeStore`] fulfils it against
//! the Kubernetes API.

use crate::error::StoreError;
use crate::models::{
    Application, PodInfo, APPLICATION_GROUP, APPLICATION_KIND, APPLICATION_VERSION,
};
use crate::selector::LabelSelector;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ApiResource, DynamicObject, ListParams};
use kube::core::GroupVersionKind;
use kube::{Client, ResourceExt};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Read-only view of the cluster state the exporter reports on
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// List every Application in the cluster, in store order
    async fn list_applications(&self) -> Result<Vec<Application>, StoreError>;

    /// List the Pods of `namespace` matching `selector`, in store order
    async fn list_pods(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<PodInfo>, StoreError>;
}

/// Subset of the Application spec the exporter reads
#[derive(Debug, Default, Deserialize)]
struct ApplicationSpec {
    #[serde(default)]
    selector: Option<SelectorSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectorSpec {
    #[serde(default)]
    match_labels: Option<BTreeMap<String, String>>,
}

/// [`ResourceStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    applications: ApiResource,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        let gvk = GroupVersionKind::gvk(APPLICATION_GROUP, APPLICATION_VERSION, APPLICATION_KIND);
        Self {
            client,
            applications: ApiResource::from_gvk(&gvk),
        }
    }
}

#[async_trait]
impl ResourceStore for KubeStore {
    async fn list_applications(&self) -> Result<Vec<Application>, StoreError> {
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &self.applications);
        let list = api.list(&ListParams::default()).await?;
        debug!(count = list.items.len(), "Listed applications");

        list.items.iter().map(application_from_object).collect()
    }

    async fn list_pods(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<PodInfo>, StoreError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let mut params = ListParams::default();
        if !selector.is_empty() {
            params = params.labels(&selector.to_string());
        }

        let list = api.list(&params).await?;
        debug!(
            namespace = %namespace,
            selector = %selector,
            count = list.items.len(),
            "Listed pods"
        );

        Ok(list.items.iter().map(pod_info_from_pod).collect())
    }
}

/// Read an Application out of its dynamic representation
///
/// A missing `spec`, `selector` or `matchLabels` yields an empty selector.
pub(crate) fn application_from_object(obj: &DynamicObject) -> Result<Application, StoreError> {
    let namespace = obj.namespace().unwrap_or_default();
    let name = obj.name_any();

    let spec = match obj.data.get("spec") {
        Some(value) => ApplicationSpec::deserialize(value).map_err(|source| StoreError::Decode {
            kind: APPLICATION_KIND,
            namespace: namespace.clone(),
            name: name.clone(),
            source,
        })?,
        None => ApplicationSpec::default(),
    };

    let match_labels = spec
        .selector
        .and_then(|s| s.match_labels)
        .unwrap_or_default();

    Ok(Application {
        namespace,
        name,
        match_labels,
    })
}

pub(crate) fn pod_info_from_pod(pod: &Pod) -> PodInfo {
    let containers = pod
        .spec
        .as_ref()
        .map(|spec| spec.containers.iter().map(|c| c.name.clone()).collect())
        .unwrap_or_default();

    PodInfo {
        namespace: pod.namespace().unwrap_or_default(),
        name: pod.name_any(),
        containers,
    }
}
