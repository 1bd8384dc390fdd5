//! Error types for policy registration and resolution

use thiserror::Error;

/// Error returned by a check body or a named method
pub type CheckError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Policy registry errors
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Invalid rule or registry configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A rule already exists for the same authorization type and entity type
    #[error(
        "Duplicate rule on {policy_type}: '{authorization_type}' is already defined for entity type {entity_type}"
    )]
    DuplicateRule {
        policy_type: String,
        authorization_type: String,
        entity_type: String,
    },

    /// A matched rule failed during evaluation
    #[error("Resolution of '{authorization_type}' on {policy_type} failed: {source}")]
    Resolution {
        policy_type: String,
        authorization_type: String,
        #[source]
        source: CheckError,
    },

    /// A check called a method that was never defined on the policy type
    #[error("Undefined method '{method}' on {policy_type}")]
    UndefinedMethod { policy_type: String, method: String },

    /// The authorization type has no accessor on the policy type
    #[error("No such authorization '{authorization_type}' on {policy_type}")]
    NoSuchAuthorization {
        policy_type: String,
        authorization_type: String,
    },
}

impl PolicyError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Result type for policy operations
pub type Result<T> = std::result::Result<T, PolicyError>;
