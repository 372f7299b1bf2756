//! Unified error types for Datum.
//!
//! One canonical error enum shared by every crate in the workspace. All
//! failures are synchronous returns (or `Err` futures in async mode):
//! these are programmer errors surfaced immediately, never transient
//! conditions with a retry policy.

use thiserror::Error;

/// All Datum errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Mutation attempted on a locked instance (`set`, `seal`, `freeze`).
    /// The instance state is unchanged.
    #[error("cannot {op} when data is locked")]
    Locked {
        /// The operation that was rejected
        op: &'static str,
    },

    /// `set` attempted on a destroyed container.
    #[error("cannot {op} a destroyed container")]
    Destroyed {
        /// The operation that was rejected
        op: &'static str,
    },

    /// In-place edit attempted on a frozen value node.
    #[error("value node is frozen")]
    Frozen,

    /// Indexed construction requires a numeric field on the wrapped object.
    #[error("index key {key:?} must hold an Int value, got {actual}")]
    IndexKey {
        /// The field name that was inspected
        key: String,
        /// Kind name of what was found, or "missing"
        actual: &'static str,
    },

    /// Wrong value kind for the operation.
    #[error("wrong kind: expected {expected}, got {actual}")]
    WrongType {
        /// Expected kind
        expected: &'static str,
        /// Actual kind found
        actual: &'static str,
    },

    /// Canonical serialization failed (cyclic graph or encoder error).
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for Datum operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a locked-mutation rejection.
    pub fn is_locked(&self) -> bool {
        matches!(self, Error::Locked { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            Error::Locked { op: "set" }.to_string(),
            "cannot set when data is locked"
        );
        assert_eq!(
            Error::IndexKey {
                key: "id".to_string(),
                actual: "String"
            }
            .to_string(),
            "index key \"id\" must hold an Int value, got String"
        );
    }

    #[test]
    fn locked_predicate() {
        assert!(Error::Locked { op: "freeze" }.is_locked());
        assert!(!Error::Frozen.is_locked());
    }
}
