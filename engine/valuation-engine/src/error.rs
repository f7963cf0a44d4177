//! Error types for the valuation engine
//!
//! Partial data is never an error here: missing stat fields count as zero,
//! short histories and degenerate correlations come back as `None`. Only a
//! collaborator that cannot answer, or a broken configuration, fails an
//! operation.

use thiserror::Error;

/// Result type for valuation engine operations
pub type Result<T> = std::result::Result<T, ValuationError>;

/// Errors that can occur in the valuation engine
#[derive(Error, Debug)]
pub enum ValuationError {
    /// A stats/salary source or the persistence store failed to answer
    #[error("Upstream unavailable ({collaborator}): {message}")]
    UpstreamUnavailable { collaborator: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ValuationError {
    /// Create a new upstream-unavailable error
    pub fn upstream(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable { collaborator: collaborator.into(), message: message.into() }
    }

    /// Create a new configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True when the failure came from a collaborator rather than from the engine itself
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_display() {
        let err = ValuationError::upstream("postgres", "connection refused");
        assert!(err.is_upstream());
        assert_eq!(err.to_string(), "Upstream unavailable (postgres): connection refused");
    }

    #[test]
    fn test_config_error_is_not_upstream() {
        let err = ValuationError::invalid_config("report limit must be > 0");
        assert!(!err.is_upstream());
    }
}
