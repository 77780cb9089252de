//! Error taxonomy shared by the store, the traversal engine and the façade.

use crate::node::{NodeKey, NodeKind};
use thiserror::Error;

/// Errors surfaced by engine operations.
///
/// `NotFound` and `InvalidArgument` are ordinary, user-correctable outcomes.
/// `StoreUnavailable` and `Internal` come from the backing store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("No such {kind} exists: {key}")]
    NotFound { kind: NodeKind, key: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Query was cancelled")]
    Cancelled,
}

impl EngineError {
    /// Builds a `NotFound` for the given key.
    pub fn not_found(key: &NodeKey) -> Self {
        Self::NotFound {
            kind: key.kind,
            key: key.key.clone(),
        }
    }

    /// Builds an `InvalidArgument` with a message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Whether the hosting layer may retry the whole call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = EngineError::not_found(&NodeKey::movie("Unknown Title"));
        assert_eq!(err.to_string(), "No such movie exists: Unknown Title");
    }

    #[test]
    fn test_only_store_failures_are_retryable() {
        assert!(EngineError::StoreUnavailable("timeout".into()).is_retryable());
        assert!(!EngineError::Internal("bad state".into()).is_retryable());
        assert!(!EngineError::invalid("degree").is_retryable());
        assert!(!EngineError::Cancelled.is_retryable());
    }
}
