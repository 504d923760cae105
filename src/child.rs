use std::fmt;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;

/// Kinds of objects owned by a workload, in the order a pass creates them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChildKind {
    Deployment,
    Service,
    Ingress,
}

impl ChildKind {
    pub const ALL: [ChildKind; 3] = [ChildKind::Deployment, ChildKind::Service, ChildKind::Ingress];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChildKind::Deployment => "Deployment",
            ChildKind::Service => "Service",
            ChildKind::Ingress => "Ingress",
        }
    }
}

impl fmt::Display for ChildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ChildObject {
    Deployment(Deployment),
    Service(Service),
    Ingress(Ingress),
}

impl ChildObject {
    pub fn kind(&self) -> ChildKind {
        match self {
            ChildObject::Deployment(_) => ChildKind::Deployment,
            ChildObject::Service(_) => ChildKind::Service,
            ChildObject::Ingress(_) => ChildKind::Ingress,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            ChildObject::Deployment(d) => d.meta(),
            ChildObject::Service(s) => s.meta(),
            ChildObject::Ingress(i) => i.meta(),
        }
    }

    pub fn metadata_mut(&mut self) -> &mut ObjectMeta {
        match self {
            ChildObject::Deployment(d) => d.meta_mut(),
            ChildObject::Service(s) => s.meta_mut(),
            ChildObject::Ingress(i) => i.meta_mut(),
        }
    }

    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        self.metadata().namespace.as_deref().unwrap_or_default()
    }

    pub fn as_deployment(&self) -> Option<&Deployment> {
        match self {
            ChildObject::Deployment(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&Service> {
        match self {
            ChildObject::Service(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ingress(&self) -> Option<&Ingress> {
        match self {
            ChildObject::Ingress(i) => Some(i),
            _ => None,
        }
    }
}

impl From<Deployment> for ChildObject {
    fn from(value: Deployment) -> Self {
        ChildObject::Deployment(value)
    }
}

impl From<Service> for ChildObject {
    fn from(value: Service) -> Self {
        ChildObject::Service(value)
    }
}

impl From<Ingress> for ChildObject {
    fn from(value: Ingress) -> Self {
        ChildObject::Ingress(value)
    }
}
