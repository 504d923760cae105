#![allow(dead_code)]

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ObjectReference;
use microservice_operator::client::EventKind;
use microservice_operator::crd::MicroserviceSpec;
use microservice_operator::{
    ChildKind, ChildObject, ClusterClient, Error, Microservice, ObjectKey, Result, WorkloadStatus,
};
use parking_lot::Mutex;

pub fn microservice(name: &str, namespace: &str, replicas: Option<i32>, image: &str, port: i32) -> Microservice {
    let mut ms = Microservice::new(
        name,
        MicroserviceSpec {
            replicas,
            image: image.to_string(),
            port,
            ingress_host: None,
        },
    );
    ms.metadata.namespace = Some(namespace.to_string());
    ms.metadata.uid = Some(format!("uid-{name}"));
    ms.metadata.generation = Some(1);
    ms
}

pub fn auth() -> Microservice {
    microservice("auth", "default", Some(2), "auth:v1", 8080)
}

pub fn api_error(code: u16, reason: &str) -> Error {
    Error::Kube(kube::Error::Api(kube::core::ErrorResponse {
        status: "Failure".to_string(),
        message: format!("injected {reason}"),
        reason: reason.to_string(),
        code,
    }))
}

#[derive(Default)]
struct State {
    parents: BTreeMap<(String, String), Microservice>,
    children: BTreeMap<(ChildKind, String, String), ChildObject>,
    created: Vec<ChildObject>,
    status_writes: Vec<WorkloadStatus>,
    events: Vec<(String, String)>,
    parent_reads: usize,
    child_reads: usize,
    fail_create: BTreeMap<ChildKind, (u16, String)>,
    delete_parent_after_reads: Option<usize>,
}

/// In-memory cluster that records every call made by the reconciler.
#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<State>,
    latency: Option<Duration>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            state: Mutex::default(),
            latency: Some(latency),
        }
    }

    pub fn with_parent(self, parent: Microservice) -> Self {
        self.put_parent(parent);
        self
    }

    pub fn put_parent(&self, parent: Microservice) {
        let key = ObjectKey::of(&parent);
        self.state
            .lock()
            .parents
            .insert((key.namespace, key.name), parent);
    }

    pub fn delete_parent(&self, key: &ObjectKey) {
        self.state
            .lock()
            .parents
            .remove(&(key.namespace.clone(), key.name.clone()));
    }

    /// Make the parent disappear once it has been read `reads` times.
    pub fn delete_parent_after_reads(&self, reads: usize) {
        self.state.lock().delete_parent_after_reads = Some(reads);
    }

    pub fn put_child(&self, child: ChildObject) {
        let key = (child.kind(), child.namespace().to_string(), child.name().to_string());
        self.state.lock().children.insert(key, child);
    }

    pub fn fail_create(&self, kind: ChildKind, code: u16, reason: &str) {
        self.state
            .lock()
            .fail_create
            .insert(kind, (code, reason.to_string()));
    }

    pub fn child(&self, kind: ChildKind, key: &ObjectKey) -> Option<ChildObject> {
        self.state
            .lock()
            .children
            .get(&(kind, key.namespace.clone(), key.name.clone()))
            .cloned()
    }

    pub fn parent(&self, key: &ObjectKey) -> Option<Microservice> {
        self.state
            .lock()
            .parents
            .get(&(key.namespace.clone(), key.name.clone()))
            .cloned()
    }

    pub fn created(&self) -> Vec<ChildObject> {
        self.state.lock().created.clone()
    }

    pub fn created_kinds(&self) -> Vec<ChildKind> {
        self.state.lock().created.iter().map(|c| c.kind()).collect()
    }

    pub fn status_writes(&self) -> usize {
        self.state.lock().status_writes.len()
    }

    pub fn events(&self) -> Vec<(String, String)> {
        self.state.lock().events.clone()
    }

    pub fn parent_reads(&self) -> usize {
        self.state.lock().parent_reads
    }

    pub fn child_reads(&self) -> usize {
        self.state.lock().child_reads
    }

    /// Creates plus status writes; events are not counted.
    pub fn mutations(&self) -> usize {
        let state = self.state.lock();
        state.created.len() + state.status_writes.len()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ClusterClient<Microservice> for FakeCluster {
    async fn get_parent(&self, key: &ObjectKey) -> Result<Option<Microservice>> {
        self.delay().await;
        let mut state = self.state.lock();
        state.parent_reads += 1;
        let parent = state
            .parents
            .get(&(key.namespace.clone(), key.name.clone()))
            .cloned();
        if state.delete_parent_after_reads == Some(state.parent_reads) {
            state.parents.remove(&(key.namespace.clone(), key.name.clone()));
        }
        Ok(parent)
    }

    async fn get_child(&self, kind: ChildKind, key: &ObjectKey) -> Result<Option<ChildObject>> {
        self.delay().await;
        let mut state = self.state.lock();
        state.child_reads += 1;
        Ok(state
            .children
            .get(&(kind, key.namespace.clone(), key.name.clone()))
            .cloned())
    }

    async fn create_child(&self, child: &ChildObject) -> Result<()> {
        self.delay().await;
        let mut state = self.state.lock();
        if let Some((code, reason)) = state.fail_create.get(&child.kind()).cloned() {
            return Err(api_error(code, &reason));
        }
        let key = (child.kind(), child.namespace().to_string(), child.name().to_string());
        if state.children.contains_key(&key) {
            return Err(api_error(409, "AlreadyExists"));
        }
        state.children.insert(key, child.clone());
        state.created.push(child.clone());
        Ok(())
    }

    async fn patch_status(&self, key: &ObjectKey, status: &WorkloadStatus) -> Result<()> {
        self.delay().await;
        let mut state = self.state.lock();
        let Some(parent) = state
            .parents
            .get_mut(&(key.namespace.clone(), key.name.clone()))
        else {
            return Err(api_error(404, "NotFound"));
        };
        parent.status = Some(status.clone());
        state.status_writes.push(status.clone());
        Ok(())
    }

    async fn publish_event(
        &self,
        _regarding: &ObjectReference,
        _kind: EventKind,
        reason: &str,
        message: &str,
    ) -> Result<()> {
        self.state
            .lock()
            .events
            .push((reason.to_string(), message.to_string()));
        Ok(())
    }
}
