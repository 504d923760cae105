//! Status written back onto a workload resource at the end of a reconcile pass.
//!
//! Conditions follow the usual Kubernetes shape. Transition timestamps are
//! carried over from the stored status when a condition keeps its value, so
//! recomputing the same status twice yields an equal value and no write.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const READY: &str = "Ready";
pub const PROGRESSING: &str = "Progressing";
pub const FAILED: &str = "Failed";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Child kinds present after the pass, in creation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

impl WorkloadStatus {
    pub fn condition(&self, type_: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.type_ == type_)
    }

    pub fn is_ready(&self) -> bool {
        self.condition(READY)
            .map(|c| c.status == ConditionStatus::True)
            .unwrap_or(false)
    }

    /// Reuse `previous` transition times for conditions whose status did not flip.
    pub fn carry_transition_times(mut self, previous: Option<&WorkloadStatus>) -> Self {
        let Some(previous) = previous else {
            return self;
        };
        for condition in &mut self.conditions {
            if let Some(old) = previous.condition(&condition.type_) {
                if old.status == condition.status {
                    condition.last_transition_time = old.last_transition_time.clone();
                }
            }
        }
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl From<bool> for ConditionStatus {
    fn from(value: bool) -> Self {
        if value {
            ConditionStatus::True
        } else {
            ConditionStatus::False
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    pub last_transition_time: String,
}

impl Condition {
    pub fn new(type_: impl Into<String>, status: impl Into<ConditionStatus>) -> Self {
        Self {
            type_: type_.into(),
            status: status.into(),
            reason: String::new(),
            message: String::new(),
            last_transition_time: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn ready(status: bool) -> Self {
        Self::new(READY, status).reason(if status { "Ready" } else { "NotReady" })
    }

    pub fn progressing(status: bool) -> Self {
        Self::new(PROGRESSING, status).reason(if status { "Progressing" } else { "Complete" })
    }

    pub fn failed(status: bool) -> Self {
        Self::new(FAILED, status).reason(if status { "ReconcileError" } else { "Succeeded" })
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}
