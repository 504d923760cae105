use k8s_openapi::api::core::v1 as core;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use super::{AppLabels, Blueprint};

/// ClusterIP Service forwarding one port to the pods labelled with the same app.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceBlueprint {
    labels: AppLabels,
    port: i32,
    target_port: i32,
}

impl ServiceBlueprint {
    pub fn new(labels: AppLabels, port: i32, target_port: i32) -> Self {
        Self {
            labels,
            port,
            target_port,
        }
    }
}

impl Blueprint for ServiceBlueprint {
    type Object = core::Service;

    fn render(self, namespace: &str) -> core::Service {
        core::Service {
            metadata: self.labels.object_meta(namespace),
            spec: Some(core::ServiceSpec {
                type_: Some("ClusterIP".to_string()),
                selector: Some(self.labels.to_map()),
                ports: Some(vec![core::ServicePort {
                    port: self.port,
                    target_port: Some(IntOrString::Int(self.target_port)),
                    protocol: Some("TCP".to_string()),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}
