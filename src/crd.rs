//! Desired-state resources handled by the operator.
//!
//! Every kind exposes the same capabilities through [`Workload`], so one
//! generic reconciler serves all of them.

use std::fmt::Debug;

use kube::core::NamespaceResourceScope;
use kube::{CustomResource, Resource};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::status::WorkloadStatus;

pub const DEFAULT_REPLICAS: i32 = 1;
pub const DEFAULT_CONTAINER_PORT: i32 = 80;

/// What the reconciler needs to know about a desired-state resource.
pub trait Workload:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// `None` when the user left the field unset.
    fn replicas(&self) -> Option<i32>;
    fn image(&self) -> &str;
    fn container_port(&self) -> i32;
    fn ingress_host(&self) -> Option<&str>;
    fn workload_status(&self) -> Option<&WorkloadStatus>;
}

/// Microservice is a single containerised HTTP service exposed through a
/// Service and an Ingress.
#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "example.com",
    version = "v1",
    kind = "Microservice",
    plural = "microservices",
    shortname = "ms",
    namespaced,
    status = "WorkloadStatus",
    printcolumn = r#"{"name":"Image", "type":"string", "jsonPath":".spec.image"}"#,
    printcolumn = r#"{"name":"Replicas", "type":"integer", "jsonPath":".spec.replicas"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct MicroserviceSpec {
    /// Desired pod count. Defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Container image reference.
    pub image: String,

    /// Port the container listens on.
    pub port: i32,

    /// Host for the Ingress rule. Unset matches every host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_host: Option<String>,
}

impl Workload for Microservice {
    fn replicas(&self) -> Option<i32> {
        self.spec.replicas
    }

    fn image(&self) -> &str {
        &self.spec.image
    }

    fn container_port(&self) -> i32 {
        self.spec.port
    }

    fn ingress_host(&self) -> Option<&str> {
        self.spec.ingress_host.as_deref()
    }

    fn workload_status(&self) -> Option<&WorkloadStatus> {
        self.status.as_ref()
    }
}

/// Shared spec for the fixed-purpose platform services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformServiceSpec {
    pub replicas: i32,
    pub image: String,
    #[serde(default = "default_container_port")]
    pub port: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_host: Option<String>,
}

fn default_container_port() -> i32 {
    DEFAULT_CONTAINER_PORT
}

#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "microservice.example.com",
    version = "v1alpha1",
    kind = "CoreUI",
    root = "CoreUi",
    plural = "coreuis",
    namespaced,
    status = "WorkloadStatus"
)]
pub struct CoreUiSpec {
    #[serde(flatten)]
    pub service: PlatformServiceSpec,
}

#[derive(CustomResource, Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "microservice.example.com",
    version = "v1alpha1",
    kind = "AuthenticationService",
    plural = "authenticationservices",
    namespaced,
    status = "WorkloadStatus"
)]
pub struct AuthenticationServiceSpec {
    #[serde(flatten)]
    pub service: PlatformServiceSpec,
}

macro_rules! platform_workload {
    ($kind:ty) => {
        impl Workload for $kind {
            fn replicas(&self) -> Option<i32> {
                Some(self.spec.service.replicas)
            }

            fn image(&self) -> &str {
                &self.spec.service.image
            }

            fn container_port(&self) -> i32 {
                self.spec.service.port
            }

            fn ingress_host(&self) -> Option<&str> {
                self.spec.service.ingress_host.as_deref()
            }

            fn workload_status(&self) -> Option<&WorkloadStatus> {
                self.status.as_ref()
            }
        }
    };
}

platform_workload!(CoreUi);
platform_workload!(AuthenticationService);
