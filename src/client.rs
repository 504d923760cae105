//! Cluster read/write interface used by the reconciler.
//!
//! The trait keeps the engine independent of a live API server; the
//! kube-backed implementation is what the operator runs with.

use std::fmt;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Event, ObjectReference, Service};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use kube::api::{Api, Patch, PatchParams, PostParams};
use kube::core::NamespaceResourceScope;
use kube::{Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::child::{ChildKind, ChildObject};
use crate::crd::Workload;
use crate::error::{Error, Result};
use crate::status::WorkloadStatus;

/// Namespace and name of an object. Children share their parent's key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn of<K: Resource>(resource: &K) -> Self {
        Self::new(resource.namespace().unwrap_or_default(), resource.name_any())
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Normal,
    Warning,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Normal => "Normal",
            EventKind::Warning => "Warning",
        }
    }
}

/// Cluster operations a reconcile pass may issue. Reads return `None` for
/// objects that do not exist; writes surface "not found" as an error that
/// answers true to [`Error::is_not_found`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterClient<R: Workload>: Send + Sync {
    async fn get_parent(&self, key: &ObjectKey) -> Result<Option<R>>;

    async fn get_child(&self, kind: ChildKind, key: &ObjectKey) -> Result<Option<ChildObject>>;

    async fn create_child(&self, child: &ChildObject) -> Result<()>;

    async fn patch_status(&self, key: &ObjectKey, status: &WorkloadStatus) -> Result<()>;

    async fn publish_event(
        &self,
        regarding: &ObjectReference,
        kind: EventKind,
        reason: &str,
        message: &str,
    ) -> Result<()>;
}

/// [`ClusterClient`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
    field_manager: String,
    reporting_instance: String,
}

impl KubeClusterClient {
    pub fn new(
        client: Client,
        field_manager: impl Into<String>,
        reporting_instance: impl Into<String>,
    ) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
            reporting_instance: reporting_instance.into(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn get<K>(&self, key: &ObjectKey) -> Result<Option<K>>
    where
        K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
            + Clone
            + fmt::Debug
            + DeserializeOwned,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), &key.namespace);

        match api.get(&key.name).await {
            Ok(resource) => Ok(Some(resource)),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(None),
            Err(e) => Err(Error::Kube(e)),
        }
    }

    async fn create<K>(&self, namespace: &str, resource: &K) -> Result<()>
    where
        K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
            + Clone
            + fmt::Debug
            + Serialize
            + DeserializeOwned,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let params = PostParams {
            field_manager: Some(self.field_manager.clone()),
            ..Default::default()
        };

        api.create(&params, resource).await.map_err(Error::Kube)?;
        Ok(())
    }
}

#[async_trait]
impl<R: Workload> ClusterClient<R> for KubeClusterClient {
    async fn get_parent(&self, key: &ObjectKey) -> Result<Option<R>> {
        self.get::<R>(key).await
    }

    async fn get_child(&self, kind: ChildKind, key: &ObjectKey) -> Result<Option<ChildObject>> {
        let child = match kind {
            ChildKind::Deployment => self.get::<Deployment>(key).await?.map(ChildObject::from),
            ChildKind::Service => self.get::<Service>(key).await?.map(ChildObject::from),
            ChildKind::Ingress => self.get::<Ingress>(key).await?.map(ChildObject::from),
        };
        Ok(child)
    }

    async fn create_child(&self, child: &ChildObject) -> Result<()> {
        let namespace = child.namespace();
        match child {
            ChildObject::Deployment(d) => self.create(namespace, d).await,
            ChildObject::Service(s) => self.create(namespace, s).await,
            ChildObject::Ingress(i) => self.create(namespace, i).await,
        }
    }

    async fn patch_status(&self, key: &ObjectKey, status: &WorkloadStatus) -> Result<()> {
        let api: Api<R> = Api::namespaced(self.client.clone(), &key.namespace);

        let status_json = serde_json::json!({
            "status": serde_json::to_value(status)?
        });

        api.patch_status(&key.name, &PatchParams::default(), &Patch::Merge(&status_json))
            .await
            .map_err(Error::Kube)?;

        debug!(kind = %R::kind(&()), key = %key, "patched status");
        Ok(())
    }

    async fn publish_event(
        &self,
        regarding: &ObjectReference,
        kind: EventKind,
        reason: &str,
        message: &str,
    ) -> Result<()> {
        let namespace = regarding.namespace.clone().unwrap_or_default();
        let api: Api<Event> = Api::namespaced(self.client.clone(), &namespace);

        let now = chrono::Utc::now();
        let event_name = format!(
            "{}.{:x}",
            regarding.name.as_deref().unwrap_or("unknown"),
            now.timestamp_nanos_opt().unwrap_or_default()
        );

        let event = Event {
            metadata: ObjectMeta {
                name: Some(event_name),
                namespace: Some(namespace),
                ..Default::default()
            },
            type_: Some(kind.as_str().to_string()),
            reason: Some(reason.to_string()),
            message: Some(message.to_string()),
            involved_object: regarding.clone(),
            first_timestamp: Some(Time(now)),
            last_timestamp: Some(Time(now)),
            count: Some(1),
            reporting_component: Some(self.field_manager.clone()),
            reporting_instance: Some(self.reporting_instance.clone()),
            ..Default::default()
        };

        api.create(&PostParams::default(), &event)
            .await
            .map_err(Error::Kube)?;

        Ok(())
    }
}

/// Reference used as the `involvedObject` of events about `resource`.
pub fn object_reference<K>(resource: &K) -> ObjectReference
where
    K: Resource<DynamicType = ()>,
{
    ObjectReference {
        api_version: Some(K::api_version(&()).to_string()),
        kind: Some(K::kind(&()).to_string()),
        name: Some(resource.name_any()),
        namespace: resource.namespace(),
        uid: resource.uid(),
        resource_version: resource.resource_version(),
        ..Default::default()
    }
}
