//! Resource error types

use keel_types::DefinitionError;
use thiserror::Error;

/// Errors returned by a provider API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The request never got a provider answer
    #[error("connection failed: {0}")]
    Connection(String),

    /// The provider answered with an error
    #[error("{code}: {message}")]
    Rejected { code: String, message: String },
}

impl ProviderError {
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Resource facade errors
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Invalid definition: {0}")]
    InvalidDefinition(#[from] DefinitionError),

    #[error("{action} {target}: provider unreachable: {reason}")]
    Connection {
        action: &'static str,
        target: String,
        reason: String,
    },

    #[error("{action} {target}: rejected by provider: {code}: {message}")]
    ProviderRejection {
        action: &'static str,
        target: String,
        code: String,
        message: String,
    },
}

impl ResourceError {
    /// Attach call context to a provider failure
    pub fn from_provider(action: &'static str, target: impl Into<String>, err: ProviderError) -> Self {
        let target = target.into();
        match err {
            ProviderError::Connection(reason) => ResourceError::Connection {
                action,
                target,
                reason,
            },
            ProviderError::Rejected { code, message } => ResourceError::ProviderRejection {
                action,
                target,
                code,
                message,
            },
        }
    }

    /// Action the failing call was performing, if it reached the provider
    pub fn action(&self) -> Option<&'static str> {
        match self {
            ResourceError::InvalidDefinition(_) => None,
            ResourceError::Connection { action, .. }
            | ResourceError::ProviderRejection { action, .. } => Some(action),
        }
    }
}

/// Result type for resource operations
pub type Result<T> = std::result::Result<T, ResourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_provider_keeps_context() {
        let err = ResourceError::from_provider(
            "CreateLoadBalancer",
            "web",
            ProviderError::rejected("DuplicateLoadBalancerName", "already exists"),
        );
        assert_eq!(err.action(), Some("CreateLoadBalancer"));
        assert_eq!(
            err.to_string(),
            "CreateLoadBalancer web: rejected by provider: DuplicateLoadBalancerName: already exists"
        );

        let err = ResourceError::from_provider("StopInstances", "[i-1]", ProviderError::Connection("timeout".into()));
        assert!(matches!(err, ResourceError::Connection { ref reason, .. } if reason == "timeout"));
    }
}
