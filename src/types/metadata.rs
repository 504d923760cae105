use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

pub const APP_LABEL: &str = "app";

/// `app: <name>`, carried by every owned object and used as the pod selector.
/// The application name doubles as the object name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppLabels {
    app: String,
}

impl AppLabels {
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into() }
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(APP_LABEL.to_string(), self.app.clone())])
    }

    pub fn object_meta(&self, namespace: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(self.app.clone()),
            namespace: Some(namespace.to_string()),
            labels: Some(self.to_map()),
            ..Default::default()
        }
    }
}
