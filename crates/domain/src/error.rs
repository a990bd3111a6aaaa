//! Domain error types.

use thiserror::Error;

use crate::status::ProcessStatus;
use crate::value_objects::LevelId;

/// Errors raised by the approval process state machine.
///
/// Every variant is a business-rule violation: non-retryable, and expected
/// under at-least-once delivery (a redelivered event usually lands on state
/// it can no longer apply to).
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The event is not applicable to the instance's current status.
    #[error("cannot {action} a process in {status} status")]
    InvalidTransition {
        action: &'static str,
        status: ProcessStatus,
    },

    /// The decided level is not currently open per the instance topology.
    #[error("level {level} is not open for a decision")]
    LevelNotOpen { level: LevelId },

    /// A process definition must configure at least one level.
    #[error("process definition has no levels")]
    EmptyDefinition,

    /// A process definition configured the same level twice.
    #[error("duplicate level {0} in process definition")]
    DuplicateLevel(LevelId),
}
