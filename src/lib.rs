pub mod builder;
pub mod child;
pub mod client;
pub mod config;
pub mod context;
pub mod crd;
pub mod error;
pub mod operator;
pub mod owner;
pub mod reconciler;
pub mod status;
pub mod types;

pub use child::{ChildKind, ChildObject};
pub use client::{ClusterClient, KubeClusterClient, ObjectKey};
pub use config::OperatorConfig;
pub use context::Context;
pub use crd::{AuthenticationService, CoreUi, Microservice, Workload};
pub use error::{Error, Result};
pub use operator::{Operator, WatchRegistration};
pub use reconciler::{Outcome, Reconciler};
pub use status::{Condition, ConditionStatus, WorkloadStatus};

pub mod prelude {
    pub use crate::builder::{build_deployment, build_ingress, build_service, BuildOptions};
    pub use crate::child::{ChildKind, ChildObject};
    pub use crate::client::{ClusterClient, EventKind, ObjectKey};
    pub use crate::config::OperatorConfig;
    pub use crate::crd::{
        AuthenticationService, AuthenticationServiceSpec, CoreUi, CoreUiSpec, Microservice,
        MicroserviceSpec, PlatformServiceSpec, Workload,
    };
    pub use crate::error::{Error, Result};
    pub use crate::operator::Operator;
    pub use crate::owner::set_owner;
    pub use crate::reconciler::{Outcome, Reconciler};
    pub use crate::status::{Condition, ConditionStatus, WorkloadStatus};

    pub use kube::runtime::controller::Action;
    pub use std::sync::Arc;
}
