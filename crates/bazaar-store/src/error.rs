//! Store error types.

use thiserror::Error;

use crate::Version;

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A conditional write found a different version than expected.
    #[error("version conflict on {key:?}: expected {expected:?}, found {found:?}")]
    Conflict {
        /// Key being written.
        key: String,
        /// Version the writer read.
        expected: Option<Version>,
        /// Version currently stored.
        found: Option<Version>,
    },
}

/// A specialized Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
