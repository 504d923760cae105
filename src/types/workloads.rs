use k8s_openapi::api::apps::v1 as apps;
use k8s_openapi::api::core::v1 as core;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};

use super::{AppLabels, Blueprint, HttpContainer};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentBlueprint {
    labels: AppLabels,
    replicas: i32,
    container: HttpContainer,
}

impl DeploymentBlueprint {
    pub fn new(labels: AppLabels, container: HttpContainer) -> Self {
        Self {
            labels,
            replicas: 1,
            container,
        }
    }

    /// Negative counts are rendered as 0.
    pub fn replicas(mut self, replicas: i32) -> Self {
        self.replicas = replicas.max(0);
        self
    }
}

impl Blueprint for DeploymentBlueprint {
    type Object = apps::Deployment;

    fn render(self, namespace: &str) -> apps::Deployment {
        let pod_labels = self.labels.to_map();

        apps::Deployment {
            metadata: self.labels.object_meta(namespace),
            spec: Some(apps::DeploymentSpec {
                replicas: Some(self.replicas),
                selector: LabelSelector {
                    match_labels: Some(pod_labels.clone()),
                    ..Default::default()
                },
                template: core::PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(pod_labels),
                        ..Default::default()
                    }),
                    spec: Some(core::PodSpec {
                        containers: vec![self.container.render()],
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}
