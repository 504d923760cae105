use k8s_openapi::api::core::v1 as core;

pub const HTTP_PORT_NAME: &str = "http";

/// The single container of a workload pod, serving HTTP on one TCP port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpContainer {
    name: String,
    image: String,
    port: i32,
}

impl HttpContainer {
    pub fn new(name: impl Into<String>, image: impl Into<String>, port: i32) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            port,
        }
    }

    pub fn render(self) -> core::Container {
        core::Container {
            name: self.name,
            image: Some(self.image),
            ports: Some(vec![core::ContainerPort {
                name: Some(HTTP_PORT_NAME.to_string()),
                container_port: self.port,
                protocol: Some("TCP".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }
}
