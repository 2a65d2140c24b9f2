//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// Every variant is recoverable at the session engine boundary; none of them
/// is allowed to terminate a running session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The story graph references a node that does not exist.
    #[error("unknown story node: {0}")]
    UnknownNode(String),

    /// A node has neither choices nor an ending.
    #[error("dead-end story node: {0}")]
    DeadEndNode(String),

    /// A save code is not exactly twelve digits after normalization.
    #[error("invalid save code format: {0}")]
    InvalidFormat(String),

    /// A save code names a state that is not in the enumeration table.
    #[error("unknown save state code: {0:04}")]
    UnknownState(u16),

    /// A validation error in domain logic or authored data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_state_pads_code_to_four_digits() {
        assert_eq!(
            DomainError::UnknownState(42).to_string(),
            "unknown save state code: 0042"
        );
    }

    #[test]
    fn test_unknown_node_names_the_key() {
        assert_eq!(
            DomainError::UnknownNode("pod_bay".into()).to_string(),
            "unknown story node: pod_bay"
        );
    }
}
