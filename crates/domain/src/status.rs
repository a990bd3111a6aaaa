//! Approval process status state machine.

use serde::{Deserialize, Serialize};

/// The status of an approval process instance in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──┬──► Approved
///           ├──► Rejected
///           ├──► Cancelled
///           └──► ReturnedForInfo ──► Pending (on resubmit)
///                      │
///                      └──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProcessStatus {
    /// Awaiting decisions on one or more open levels.
    #[default]
    Pending,

    /// An approver sent the request back for more information; the process
    /// is suspended until the requester resubmits.
    ReturnedForInfo,

    /// Every level approved (terminal state).
    Approved,

    /// Rejected at some level (terminal state).
    Rejected,

    /// Cancelled by the requester (terminal state).
    Cancelled,
}

impl ProcessStatus {
    /// Returns true if level decisions (approve/reject/return) are accepted.
    pub fn can_decide(&self) -> bool {
        matches!(self, ProcessStatus::Pending)
    }

    /// Returns true if the requester can resubmit from this status.
    pub fn can_resubmit(&self) -> bool {
        matches!(self, ProcessStatus::ReturnedForInfo)
    }

    /// Returns true if the process can be cancelled from this status.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if this is a terminal status (no further events accepted).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessStatus::Approved | ProcessStatus::Rejected | ProcessStatus::Cancelled
        )
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Pending => "Pending",
            ProcessStatus::ReturnedForInfo => "ReturnedForInfo",
            ProcessStatus::Approved => "Approved",
            ProcessStatus::Rejected => "Rejected",
            ProcessStatus::Cancelled => "Cancelled",
        }
    }

    /// Returns the numeric status code published to legacy consumers.
    pub fn as_code(&self) -> i32 {
        match self {
            ProcessStatus::Pending => 0,
            ProcessStatus::ReturnedForInfo => 1,
            ProcessStatus::Approved => 2,
            ProcessStatus::Rejected => 3,
            ProcessStatus::Cancelled => 4,
        }
    }
}

impl std::fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
