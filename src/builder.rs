//! Pure mapping from a workload resource to the child objects it implies.
//!
//! Nothing here talks to the cluster. Children share the parent's name and
//! namespace and all of them carry `app: <name>`.

use k8s_openapi::api::apps::v1 as apps;
use k8s_openapi::api::core::v1 as core;
use k8s_openapi::api::networking::v1 as networking;
use kube::ResourceExt;

use crate::child::{ChildKind, ChildObject};
use crate::crd::{Workload, DEFAULT_REPLICAS};
use crate::types::{
    AppLabels, Blueprint, DeploymentBlueprint, HttpContainer, IngressBlueprint, ServiceBlueprint,
};

pub const SERVICE_PORT: i32 = 80;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub ingress_class: Option<String>,
}

pub fn build_deployment<R: Workload>(resource: &R) -> apps::Deployment {
    let labels = AppLabels::new(resource.name_any());
    let container = HttpContainer::new(labels.app(), resource.image(), resource.container_port());

    DeploymentBlueprint::new(labels, container)
        .replicas(resource.replicas().unwrap_or(DEFAULT_REPLICAS))
        .render(&parent_namespace(resource))
}

pub fn build_service<R: Workload>(resource: &R) -> core::Service {
    ServiceBlueprint::new(
        AppLabels::new(resource.name_any()),
        SERVICE_PORT,
        resource.container_port(),
    )
    .render(&parent_namespace(resource))
}

pub fn build_ingress<R: Workload>(resource: &R, options: &BuildOptions) -> networking::Ingress {
    IngressBlueprint::new(AppLabels::new(resource.name_any()), SERVICE_PORT)
        .host(resource.ingress_host())
        .class(options.ingress_class.clone())
        .render(&parent_namespace(resource))
}

pub fn build_child<R: Workload>(kind: ChildKind, resource: &R, options: &BuildOptions) -> ChildObject {
    match kind {
        ChildKind::Deployment => build_deployment(resource).into(),
        ChildKind::Service => build_service(resource).into(),
        ChildKind::Ingress => build_ingress(resource, options).into(),
    }
}

fn parent_namespace<R: Workload>(resource: &R) -> String {
    resource.namespace().unwrap_or_default()
}
