use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot set owner reference: {0}")]
    OwnershipLink(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Reconcile pass cancelled")]
    Cancelled,

    #[error("Reconcile pass exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

impl Error {
    /// True when the API server answered 404 for the object in question.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Kube(kube::Error::Api(e)) if e.code == 404)
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::Kube(kube::Error::Api(e)) if e.code == 409 && e.reason == "AlreadyExists")
    }

    /// Whether a later pass may succeed where this one failed. Configuration
    /// problems will not fix themselves.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Error::OwnershipLink(_) | Error::InvalidConfig(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn api(code: u16, reason: &str) -> Error {
        Error::Kube(kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: reason.to_string(),
            reason: reason.to_string(),
            code,
        }))
    }

    #[test]
    fn status_encoding_failures_are_serialization_errors() {
        let encode = || -> Result<serde_json::Value> {
            let bad: serde_json::Result<serde_json::Value> = serde_json::from_str("{status");
            Ok(serde_json::json!({ "status": bad? }))
        };

        let err = encode().unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
        assert!(err.is_retryable());
        assert!(!err.is_not_found());
    }

    #[test]
    fn api_errors_are_classified_by_code() {
        assert!(api(404, "NotFound").is_not_found());
        assert!(api(409, "AlreadyExists").is_already_exists());
        assert!(!api(409, "Conflict").is_already_exists());
        assert!(!Error::InvalidConfig("x".into()).is_retryable());
    }
}
