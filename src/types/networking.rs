use k8s_openapi::api::networking::v1 as networking;

use super::{AppLabels, Blueprint};

pub const ROOT_PATH: &str = "/";
pub const PATH_TYPE_PREFIX: &str = "Prefix";

/// Single-rule Ingress sending every path under `/` to the app's Service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngressBlueprint {
    labels: AppLabels,
    backend_port: i32,
    host: Option<String>,
    class: Option<String>,
}

impl IngressBlueprint {
    pub fn new(labels: AppLabels, backend_port: i32) -> Self {
        Self {
            labels,
            backend_port,
            host: None,
            class: None,
        }
    }

    /// An empty host is dropped so the rule matches every host.
    pub fn host(mut self, host: Option<&str>) -> Self {
        self.host = host.filter(|h| !h.is_empty()).map(str::to_string);
        self
    }

    pub fn class(mut self, class: Option<String>) -> Self {
        self.class = class;
        self
    }
}

impl Blueprint for IngressBlueprint {
    type Object = networking::Ingress;

    fn render(self, namespace: &str) -> networking::Ingress {
        let backend = networking::IngressBackend {
            service: Some(networking::IngressServiceBackend {
                name: self.labels.app().to_string(),
                port: Some(networking::ServiceBackendPort {
                    number: Some(self.backend_port),
                    name: None,
                }),
            }),
            resource: None,
        };

        networking::Ingress {
            metadata: self.labels.object_meta(namespace),
            spec: Some(networking::IngressSpec {
                ingress_class_name: self.class,
                rules: Some(vec![networking::IngressRule {
                    host: self.host,
                    http: Some(networking::HTTPIngressRuleValue {
                        paths: vec![networking::HTTPIngressPath {
                            path: Some(ROOT_PATH.to_string()),
                            path_type: PATH_TYPE_PREFIX.to_string(),
                            backend,
                        }],
                    }),
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}
