//! Inbound and outbound message types.
//!
//! Field layouts follow the wire contract: every inbound event carries its
//! correlation ID and the acting user; decision events additionally name
//! the level being decided. The free-text comment/reason fields are opaque
//! and optional.

use common::CorrelationId;
use domain::{LevelId, OrgStructureId, ProcessId, ProcessStatus, RecordId, UserId};
use serde::{Deserialize, Serialize};

/// Events received from the message transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InboundEvent {
    /// Originate a new approval process.
    Request(RequestData),

    /// Approve an open level.
    Approve(ApproveData),

    /// Reject the process at an open level.
    Reject(RejectData),

    /// Return the request to the requester for more information.
    Return(ReturnData),

    /// Resubmit a returned request.
    Resubmit(ResubmitData),

    /// Cancel the process.
    Cancel(CancelData),
}

/// Data for a Request event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestData {
    /// Correlation ID minted by the originator for the new instance.
    pub correlation_id: CorrelationId,
    /// The approval configuration to run.
    pub process_id: ProcessId,
    /// The organization structure (or department) ID.
    pub org_structure_id: OrgStructureId,
    /// The record ID under approval.
    pub record_id: RecordId,
    /// The user-friendly identifier for the record.
    pub record_number: String,
    /// A short string describing the record.
    pub description: String,
    /// The user id of the requestor.
    pub user_id: UserId,
    /// The absolute URL to the process page.
    pub source_uri: String,
    /// The absolute URL to the record entry page.
    pub entry_uri: String,
    /// The absolute URL to the record's approvals page.
    pub approvals_uri: String,
}

/// Data for an Approve event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveData {
    pub correlation_id: CorrelationId,
    /// The level being approved.
    pub level_id: LevelId,
    pub user_id: UserId,
    /// Any user entered comment.
    pub comment: Option<String>,
}

/// Data for a Reject event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectData {
    pub correlation_id: CorrelationId,
    /// The level issuing the rejection.
    pub level_id: LevelId,
    pub user_id: UserId,
    /// The reason the request was rejected.
    pub reason: Option<String>,
}

/// Data for a Return event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnData {
    pub correlation_id: CorrelationId,
    /// The level returning the request.
    pub level_id: LevelId,
    pub user_id: UserId,
    /// The reason the request was returned.
    pub reason: Option<String>,
}

/// Data for a Resubmit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResubmitData {
    pub correlation_id: CorrelationId,
    pub user_id: UserId,
    /// Any user entered comment.
    pub comment: Option<String>,
}

/// Data for a Cancel event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelData {
    pub correlation_id: CorrelationId,
    pub user_id: UserId,
    /// The reason for the cancellation request.
    pub reason: Option<String>,
}

impl InboundEvent {
    /// Creates an Approve event.
    pub fn approve(
        correlation_id: CorrelationId,
        level_id: LevelId,
        user_id: UserId,
        comment: Option<String>,
    ) -> Self {
        InboundEvent::Approve(ApproveData {
            correlation_id,
            level_id,
            user_id,
            comment,
        })
    }

    /// Creates a Reject event.
    pub fn reject(
        correlation_id: CorrelationId,
        level_id: LevelId,
        user_id: UserId,
        reason: Option<String>,
    ) -> Self {
        InboundEvent::Reject(RejectData {
            correlation_id,
            level_id,
            user_id,
            reason,
        })
    }

    /// Creates a Return event.
    pub fn return_for_info(
        correlation_id: CorrelationId,
        level_id: LevelId,
        user_id: UserId,
        reason: Option<String>,
    ) -> Self {
        InboundEvent::Return(ReturnData {
            correlation_id,
            level_id,
            user_id,
            reason,
        })
    }

    /// Creates a Resubmit event.
    pub fn resubmit(
        correlation_id: CorrelationId,
        user_id: UserId,
        comment: Option<String>,
    ) -> Self {
        InboundEvent::Resubmit(ResubmitData {
            correlation_id,
            user_id,
            comment,
        })
    }

    /// Creates a Cancel event.
    pub fn cancel(
        correlation_id: CorrelationId,
        user_id: UserId,
        reason: Option<String>,
    ) -> Self {
        InboundEvent::Cancel(CancelData {
            correlation_id,
            user_id,
            reason,
        })
    }

    /// Returns the correlation ID the event addresses.
    pub fn correlation_id(&self) -> CorrelationId {
        match self {
            InboundEvent::Request(d) => d.correlation_id,
            InboundEvent::Approve(d) => d.correlation_id,
            InboundEvent::Reject(d) => d.correlation_id,
            InboundEvent::Return(d) => d.correlation_id,
            InboundEvent::Resubmit(d) => d.correlation_id,
            InboundEvent::Cancel(d) => d.correlation_id,
        }
    }

    /// Returns the acting user.
    pub fn user_id(&self) -> UserId {
        match self {
            InboundEvent::Request(d) => d.user_id,
            InboundEvent::Approve(d) => d.user_id,
            InboundEvent::Reject(d) => d.user_id,
            InboundEvent::Return(d) => d.user_id,
            InboundEvent::Resubmit(d) => d.user_id,
            InboundEvent::Cancel(d) => d.user_id,
        }
    }

    /// Returns the event kind name.
    pub fn event_type(&self) -> &'static str {
        match self {
            InboundEvent::Request(_) => "Request",
            InboundEvent::Approve(_) => "Approve",
            InboundEvent::Reject(_) => "Reject",
            InboundEvent::Return(_) => "Return",
            InboundEvent::Resubmit(_) => "Resubmit",
            InboundEvent::Cancel(_) => "Cancel",
        }
    }
}

/// Status-change notification published after every accepted transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdated {
    /// The instance whose status changed.
    pub correlation_id: CorrelationId,
    /// The user whose event caused the change.
    pub user_id: UserId,
    /// The status after the transition.
    pub status: ProcessStatus,
}

impl StatusUpdated {
    /// Creates a status notification.
    pub fn new(correlation_id: CorrelationId, user_id: UserId, status: ProcessStatus) -> Self {
        Self {
            correlation_id,
            user_id,
            status,
        }
    }

    /// Returns the numeric status code carried on the legacy wire format.
    pub fn status_code(&self) -> i32 {
        self.status.as_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_names() {
        let id = CorrelationId::new();
        let user = UserId::new(1);
        let level = LevelId::new(10);

        assert_eq!(
            InboundEvent::approve(id, level, user, None).event_type(),
            "Approve"
        );
        assert_eq!(
            InboundEvent::reject(id, level, user, Some("over budget".into())).event_type(),
            "Reject"
        );
        assert_eq!(
            InboundEvent::return_for_info(id, level, user, None).event_type(),
            "Return"
        );
        assert_eq!(InboundEvent::resubmit(id, user, None).event_type(), "Resubmit");
        assert_eq!(InboundEvent::cancel(id, user, None).event_type(), "Cancel");
    }

    #[test]
    fn accessors_reach_into_every_variant() {
        let id = CorrelationId::new();
        let user = UserId::new(42);

        let events = vec![
            InboundEvent::approve(id, LevelId::new(1), user, None),
            InboundEvent::reject(id, LevelId::new(1), user, None),
            InboundEvent::return_for_info(id, LevelId::new(1), user, None),
            InboundEvent::resubmit(id, user, None),
            InboundEvent::cancel(id, user, None),
        ];

        for event in events {
            assert_eq!(event.correlation_id(), id);
            assert_eq!(event.user_id(), user);
        }
    }

    #[test]
    fn serialization_roundtrip() {
        let event = InboundEvent::approve(
            CorrelationId::new(),
            LevelId::new(3),
            UserId::new(9),
            Some("looks good".to_string()),
        );

        let json = serde_json::to_string(&event).unwrap();
        let back: InboundEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event_type(), "Approve");
        assert_eq!(back.correlation_id(), event.correlation_id());
    }

    #[test]
    fn status_updated_carries_numeric_code() {
        let update = StatusUpdated::new(
            CorrelationId::new(),
            UserId::new(5),
            ProcessStatus::Approved,
        );
        assert_eq!(update.status_code(), 2);
    }
}
