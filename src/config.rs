use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_FIELD_MANAGER: &str = "microservice-operator";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorConfig {
    /// Namespace to watch. `None` watches every namespace.
    pub namespace: Option<String>,
    pub field_manager: String,
    pub error_requeue: Duration,
    /// Upper bound for one reconcile pass. `None` disables the deadline.
    pub reconcile_timeout: Option<Duration>,
    pub ingress_class: Option<String>,
    pub reporting_instance: String,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            error_requeue: Duration::from_secs(60),
            reconcile_timeout: Some(Duration::from_secs(30)),
            ingress_class: None,
            reporting_instance: "operator".to_string(),
        }
    }
}

impl OperatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(val) = non_empty_var("OPERATOR_NAMESPACE") {
            config.namespace = Some(val);
        }

        if let Some(val) = non_empty_var("FIELD_MANAGER") {
            config.field_manager = val;
        }

        if let Some(val) = non_empty_var("ERROR_REQUEUE_SECS") {
            config.error_requeue = Duration::from_secs(parse_secs("ERROR_REQUEUE_SECS", &val)?);
        }

        if let Some(val) = non_empty_var("RECONCILE_TIMEOUT_SECS") {
            config.reconcile_timeout = match parse_secs("RECONCILE_TIMEOUT_SECS", &val)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            };
        }

        if let Some(val) = non_empty_var("INGRESS_CLASS") {
            config.ingress_class = Some(val);
        }

        if let Some(val) = non_empty_var("POD_NAME") {
            config.reporting_instance = val;
        }

        Ok(config)
    }

    pub fn namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = Some(ns.into());
        self
    }

    pub fn field_manager(mut self, name: impl Into<String>) -> Self {
        self.field_manager = name.into();
        self
    }

    pub fn error_requeue(mut self, duration: Duration) -> Self {
        self.error_requeue = duration;
        self
    }

    pub fn reconcile_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.reconcile_timeout = timeout;
        self
    }

    pub fn ingress_class(mut self, class: impl Into<String>) -> Self {
        self.ingress_class = Some(class.into());
        self
    }

    pub fn reporting_instance(mut self, instance: impl Into<String>) -> Self {
        self.reporting_instance = instance.into();
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("Invalid {key}: {value:?}")))
}
