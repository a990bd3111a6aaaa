//! Saga error types.

use common::CorrelationId;
use domain::{ProcessError, ProcessId};
use instance_store::StoreError;
use thiserror::Error;

use crate::directory::DirectoryError;

/// Errors that can occur while handling an inbound event.
///
/// Business outcomes (`UnknownInstance`, `InvalidTransition`,
/// `UnknownProcess`) are expected under at-least-once delivery and are
/// absorbed at the router boundary; the remaining variants are
/// infrastructure failures that propagate to the transport for redelivery.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The event references a correlation ID with no stored instance.
    #[error("no approval process instance for correlation id {0}")]
    UnknownInstance(CorrelationId),

    /// The event is not applicable to the instance's current state.
    #[error("invalid transition: {0}")]
    InvalidTransition(#[from] ProcessError),

    /// The request names a process ID the directory cannot resolve.
    #[error("unknown approval process {0}")]
    UnknownProcess(ProcessId),

    /// The version check kept failing past the configured attempt cap.
    #[error(
        "persistence conflict for instance {correlation_id} after {attempts} attempts"
    )]
    PersistenceConflict {
        correlation_id: CorrelationId,
        attempts: u32,
    },

    /// Process directory error.
    #[error("process directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Instance store error.
    #[error("instance store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SagaError {
    /// Returns true for non-retryable business outcomes that the router
    /// logs and discards rather than surfacing to the transport.
    pub fn is_business(&self) -> bool {
        matches!(
            self,
            SagaError::UnknownInstance(_)
                | SagaError::InvalidTransition(_)
                | SagaError::UnknownProcess(_)
        )
    }
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
