use thiserror::Error;

use crate::{CorrelationId, Version};

/// Errors that can occur when interacting with the instance store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored version did not match the expected version at write time.
    /// The caller must reload the record and retry.
    #[error(
        "version conflict for instance {correlation_id}: expected version {expected}, found {actual}"
    )]
    Conflict {
        correlation_id: CorrelationId,
        expected: Version,
        actual: Version,
    },

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for instance store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
