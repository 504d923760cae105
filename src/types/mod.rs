//! Typed blueprints for the objects a workload owns.
//!
//! A blueprint holds only the values that vary between workloads and renders
//! the full `k8s-openapi` object for a namespace. Owner references are added
//! afterwards by [`crate::owner::set_owner`].

mod container;
mod core;
mod metadata;
mod networking;
mod workloads;

pub use self::container::{HttpContainer, HTTP_PORT_NAME};
pub use self::core::ServiceBlueprint;
pub use self::metadata::{AppLabels, APP_LABEL};
pub use self::networking::{IngressBlueprint, PATH_TYPE_PREFIX, ROOT_PATH};
pub use self::workloads::DeploymentBlueprint;

use crate::child::ChildObject;

pub trait Blueprint {
    type Object: Into<ChildObject>;

    fn render(self, namespace: &str) -> Self::Object;
}
