//! The approval process instance: the persisted saga state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CorrelationId;
use crate::definition::ProcessDefinition;
use crate::error::ProcessError;
use crate::progression::{LevelTopology, Progress};
use crate::status::ProcessStatus;
use crate::value_objects::{LevelId, OrgStructureId, ProcessId, RecordId, UserId};

/// Identity and display data for the external record under approval.
///
/// Opaque to the state machine; carried through for notification payloads
/// and navigation from approval worklists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInfo {
    /// The record ID in the originating system.
    pub record_id: RecordId,
    /// The user-friendly identifier for the record.
    pub record_number: String,
    /// A short string describing the record.
    pub record_description: String,
    /// Absolute URL to the record entry page.
    pub entry_uri: String,
    /// Absolute URL to the originating process page.
    pub source_uri: String,
    /// Absolute URL to the record's approvals page.
    pub approvals_uri: String,
}

/// One running approval process, keyed by correlation ID.
///
/// The instance is mutated exclusively through its command methods, each of
/// which validates the event against the current status before applying it.
/// It holds no references to live infrastructure; the saga crate loads it
/// from the store, applies one event, and persists it whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalProcessInstance {
    correlation_id: CorrelationId,
    process_id: ProcessId,
    org_structure_id: OrgStructureId,
    request_owner_id: UserId,
    is_sequential: bool,
    /// Levels snapshotted from the definition at creation, in order.
    levels: Vec<LevelId>,
    /// Levels that have recorded an approval, in decision order.
    approved_levels: Vec<LevelId>,
    /// The level awaiting a decision; sequential topology and Pending
    /// status only.
    current_level_id: Option<LevelId>,
    /// The level that returned the request for information, while suspended.
    returned_by: Option<LevelId>,
    record: RecordInfo,
    status: ProcessStatus,
    requested_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ApprovalProcessInstance {
    /// Opens a new instance from a request event.
    ///
    /// The definition's levels are copied onto the instance so later
    /// template edits cannot affect a process already in flight.
    pub fn open(
        correlation_id: CorrelationId,
        definition: &ProcessDefinition,
        org_structure_id: OrgStructureId,
        request_owner_id: UserId,
        record: RecordInfo,
    ) -> Self {
        let now = Utc::now();
        let current_level_id = definition
            .is_sequential()
            .then(|| definition.first_level());

        Self {
            correlation_id,
            process_id: definition.process_id(),
            org_structure_id,
            request_owner_id,
            is_sequential: definition.is_sequential(),
            levels: definition.levels().to_vec(),
            approved_levels: Vec::new(),
            current_level_id,
            returned_by: None,
            record,
            status: ProcessStatus::Pending,
            requested_at: now,
            updated_at: now,
        }
    }

    fn topology(&self) -> LevelTopology<'_> {
        LevelTopology::new(&self.levels, self.is_sequential)
    }

    fn ensure_open(&self, action: &'static str, level: LevelId) -> Result<(), ProcessError> {
        if !self.status.can_decide() {
            return Err(ProcessError::InvalidTransition {
                action,
                status: self.status,
            });
        }
        if !self
            .topology()
            .is_open(&self.approved_levels, self.current_level_id, level)
        {
            return Err(ProcessError::LevelNotOpen { level });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Records an approval on an open level.
    ///
    /// Completes the instance when it was the last outstanding level;
    /// otherwise advances the sequential cursor or keeps waiting on the
    /// remaining parallel levels.
    pub fn approve(&mut self, level: LevelId) -> Result<ProcessStatus, ProcessError> {
        self.ensure_open("approve", level)?;

        match self.topology().record_approval(&self.approved_levels, level) {
            Progress::Complete => {
                self.status = ProcessStatus::Approved;
                self.current_level_id = None;
            }
            Progress::Advanced(next) => {
                self.current_level_id = Some(next);
            }
            Progress::AwaitingOthers => {}
        }
        self.approved_levels.push(level);
        self.touch();

        Ok(self.status)
    }

    /// Rejects the process at an open level.
    ///
    /// Rejection at any level halts the whole process, regardless of
    /// topology and of what other levels have decided.
    pub fn reject(&mut self, level: LevelId) -> Result<ProcessStatus, ProcessError> {
        self.ensure_open("reject", level)?;

        self.status = ProcessStatus::Rejected;
        self.current_level_id = None;
        self.touch();

        Ok(self.status)
    }

    /// Returns the request to the requester for more information.
    ///
    /// The process suspends until the requester resubmits.
    pub fn return_for_info(&mut self, level: LevelId) -> Result<ProcessStatus, ProcessError> {
        self.ensure_open("return", level)?;

        self.status = ProcessStatus::ReturnedForInfo;
        self.returned_by = Some(level);
        self.touch();

        Ok(self.status)
    }

    /// Resubmits a returned request.
    ///
    /// Sequential processes resume at the level that issued the return;
    /// parallel processes re-open every level.
    pub fn resubmit(&mut self) -> Result<ProcessStatus, ProcessError> {
        if !self.status.can_resubmit() {
            return Err(ProcessError::InvalidTransition {
                action: "resubmit",
                status: self.status,
            });
        }

        self.status = ProcessStatus::Pending;
        if self.is_sequential {
            self.current_level_id = self.returned_by.or(self.current_level_id);
        } else {
            self.approved_levels.clear();
        }
        self.returned_by = None;
        self.touch();

        Ok(self.status)
    }

    /// Cancels the process from any non-terminal status.
    pub fn cancel(&mut self) -> Result<ProcessStatus, ProcessError> {
        if !self.status.can_cancel() {
            return Err(ProcessError::InvalidTransition {
                action: "cancel",
                status: self.status,
            });
        }

        self.status = ProcessStatus::Cancelled;
        self.current_level_id = None;
        self.touch();

        Ok(self.status)
    }

    /// Returns the levels currently awaiting a decision.
    ///
    /// Empty unless the instance is `Pending`.
    pub fn open_levels(&self) -> Vec<LevelId> {
        if !self.status.can_decide() {
            return Vec::new();
        }
        self.topology()
            .open_levels(&self.approved_levels, self.current_level_id)
    }
}

// Query methods
impl ApprovalProcessInstance {
    /// Returns the correlation ID.
    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Returns the governing process (template) ID.
    pub fn process_id(&self) -> ProcessId {
        self.process_id
    }

    /// Returns the organizational scope.
    pub fn org_structure_id(&self) -> OrgStructureId {
        self.org_structure_id
    }

    /// Returns the originating requester.
    pub fn request_owner_id(&self) -> UserId {
        self.request_owner_id
    }

    /// Returns true if levels must be approved in order.
    pub fn is_sequential(&self) -> bool {
        self.is_sequential
    }

    /// Returns the configured levels in order.
    pub fn levels(&self) -> &[LevelId] {
        &self.levels
    }

    /// Returns the levels that have approved, in decision order.
    pub fn approved_levels(&self) -> &[LevelId] {
        &self.approved_levels
    }

    /// Returns the sequential cursor, if meaningful.
    pub fn current_level_id(&self) -> Option<LevelId> {
        self.current_level_id
    }

    /// Returns the level that returned the request, while suspended.
    pub fn returned_by(&self) -> Option<LevelId> {
        self.returned_by
    }

    /// Returns the record under approval.
    pub fn record(&self) -> &RecordInfo {
        &self.record
    }

    /// Returns the current lifecycle status.
    pub fn status(&self) -> ProcessStatus {
        self.status
    }

    /// Returns when the request was received.
    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }

    /// Returns when the instance last changed.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RecordInfo {
        RecordInfo {
            record_id: RecordId::new(501),
            record_number: "PO-2024-0042".to_string(),
            record_description: "Replacement plow blades".to_string(),
            entry_uri: "https://records.example/po/501".to_string(),
            source_uri: "https://records.example/po".to_string(),
            approvals_uri: "https://records.example/po/501/approvals".to_string(),
        }
    }

    fn levels(ids: &[i32]) -> Vec<LevelId> {
        ids.iter().map(|&i| LevelId::new(i)).collect()
    }

    fn sequential_instance(level_ids: &[i32]) -> ApprovalProcessInstance {
        let def = ProcessDefinition::sequential(ProcessId::new(1), levels(level_ids)).unwrap();
        ApprovalProcessInstance::open(
            CorrelationId::new(),
            &def,
            OrgStructureId::new(3),
            UserId::new(77),
            record(),
        )
    }

    fn parallel_instance(level_ids: &[i32]) -> ApprovalProcessInstance {
        let def = ProcessDefinition::parallel(ProcessId::new(2), levels(level_ids)).unwrap();
        ApprovalProcessInstance::open(
            CorrelationId::new(),
            &def,
            OrgStructureId::new(3),
            UserId::new(77),
            record(),
        )
    }

    #[test]
    fn open_initializes_pending_with_first_level_cursor() {
        let instance = sequential_instance(&[1, 2, 3]);
        assert_eq!(instance.status(), ProcessStatus::Pending);
        assert_eq!(instance.current_level_id(), Some(LevelId::new(1)));
        assert_eq!(instance.open_levels(), levels(&[1]));
        assert!(instance.approved_levels().is_empty());
    }

    #[test]
    fn open_parallel_has_no_cursor_and_all_levels_open() {
        let instance = parallel_instance(&[1, 2]);
        assert_eq!(instance.current_level_id(), None);
        assert_eq!(instance.open_levels(), levels(&[1, 2]));
    }

    #[test]
    fn sequential_approvals_in_order_complete_the_process() {
        let mut instance = sequential_instance(&[1, 2, 3]);

        assert_eq!(instance.approve(LevelId::new(1)).unwrap(), ProcessStatus::Pending);
        assert_eq!(instance.current_level_id(), Some(LevelId::new(2)));

        assert_eq!(instance.approve(LevelId::new(2)).unwrap(), ProcessStatus::Pending);
        assert_eq!(instance.current_level_id(), Some(LevelId::new(3)));

        assert_eq!(instance.approve(LevelId::new(3)).unwrap(), ProcessStatus::Approved);
        assert_eq!(instance.current_level_id(), None);
        assert_eq!(instance.approved_levels(), levels(&[1, 2, 3]).as_slice());
        assert!(instance.open_levels().is_empty());
    }

    #[test]
    fn sequential_approval_out_of_order_is_rejected() {
        let mut instance = sequential_instance(&[1, 2, 3]);

        let result = instance.approve(LevelId::new(2));
        assert!(matches!(
            result,
            Err(ProcessError::LevelNotOpen { level }) if level == LevelId::new(2)
        ));
        // State unchanged
        assert_eq!(instance.current_level_id(), Some(LevelId::new(1)));
        assert!(instance.approved_levels().is_empty());
    }

    #[test]
    fn parallel_approvals_in_any_order_complete_the_process() {
        let mut instance = parallel_instance(&[1, 2]);

        assert_eq!(instance.approve(LevelId::new(2)).unwrap(), ProcessStatus::Pending);
        assert_eq!(instance.open_levels(), levels(&[1]));

        assert_eq!(instance.approve(LevelId::new(1)).unwrap(), ProcessStatus::Approved);
        assert!(instance.open_levels().is_empty());
    }

    #[test]
    fn reject_is_terminal_in_sequential_topology() {
        let mut instance = sequential_instance(&[1, 2]);

        assert_eq!(instance.reject(LevelId::new(1)).unwrap(), ProcessStatus::Rejected);

        let result = instance.approve(LevelId::new(1));
        assert!(matches!(
            result,
            Err(ProcessError::InvalidTransition { action: "approve", .. })
        ));
    }

    #[test]
    fn reject_overrides_prior_parallel_approvals() {
        let mut instance = parallel_instance(&[1, 2]);

        instance.approve(LevelId::new(1)).unwrap();
        assert_eq!(instance.reject(LevelId::new(2)).unwrap(), ProcessStatus::Rejected);
        assert!(instance.status().is_terminal());
    }

    #[test]
    fn reject_on_closed_parallel_level_is_rejected() {
        let mut instance = parallel_instance(&[1, 2]);

        instance.approve(LevelId::new(1)).unwrap();
        let result = instance.reject(LevelId::new(1));
        assert!(matches!(result, Err(ProcessError::LevelNotOpen { .. })));
    }

    #[test]
    fn return_and_resubmit_resume_at_returning_level_sequentially() {
        let mut instance = sequential_instance(&[1, 2, 3]);

        instance.approve(LevelId::new(1)).unwrap();
        assert_eq!(
            instance.return_for_info(LevelId::new(2)).unwrap(),
            ProcessStatus::ReturnedForInfo
        );
        assert_eq!(instance.returned_by(), Some(LevelId::new(2)));
        assert!(instance.open_levels().is_empty());

        assert_eq!(instance.resubmit().unwrap(), ProcessStatus::Pending);
        assert_eq!(instance.current_level_id(), Some(LevelId::new(2)));
        // Level 1's earlier approval still stands
        assert_eq!(instance.approved_levels(), levels(&[1]).as_slice());
        assert_eq!(instance.returned_by(), None);
    }

    #[test]
    fn return_and_resubmit_reopen_all_parallel_levels() {
        let mut instance = parallel_instance(&[1, 2, 3]);

        instance.approve(LevelId::new(1)).unwrap();
        instance.return_for_info(LevelId::new(3)).unwrap();

        instance.resubmit().unwrap();
        assert_eq!(instance.open_levels(), levels(&[1, 2, 3]));
        assert!(instance.approved_levels().is_empty());
    }

    #[test]
    fn resubmit_requires_returned_status() {
        let mut instance = sequential_instance(&[1]);
        let result = instance.resubmit();
        assert!(matches!(
            result,
            Err(ProcessError::InvalidTransition { action: "resubmit", .. })
        ));
    }

    #[test]
    fn cancel_from_pending_and_returned() {
        let mut pending = sequential_instance(&[1, 2]);
        assert_eq!(pending.cancel().unwrap(), ProcessStatus::Cancelled);

        let mut returned = sequential_instance(&[1, 2]);
        returned.return_for_info(LevelId::new(1)).unwrap();
        assert_eq!(returned.cancel().unwrap(), ProcessStatus::Cancelled);
    }

    #[test]
    fn cancel_on_terminal_instance_is_rejected() {
        let mut instance = sequential_instance(&[1]);
        instance.approve(LevelId::new(1)).unwrap();

        let result = instance.cancel();
        assert!(matches!(
            result,
            Err(ProcessError::InvalidTransition { action: "cancel", .. })
        ));
    }

    #[test]
    fn decisions_on_cancelled_instance_are_rejected() {
        let mut instance = parallel_instance(&[1, 2]);
        instance.cancel().unwrap();

        assert!(instance.approve(LevelId::new(1)).is_err());
        assert!(instance.reject(LevelId::new(2)).is_err());
        assert!(instance.return_for_info(LevelId::new(1)).is_err());
    }

    #[test]
    fn serialization_roundtrip_preserves_working_state() {
        let mut instance = sequential_instance(&[1, 2, 3]);
        instance.approve(LevelId::new(1)).unwrap();
        instance.return_for_info(LevelId::new(2)).unwrap();

        let json = serde_json::to_value(&instance).unwrap();
        let back: ApprovalProcessInstance = serde_json::from_value(json).unwrap();

        assert_eq!(back, instance);
        assert_eq!(back.status(), ProcessStatus::ReturnedForInfo);
        assert_eq!(back.returned_by(), Some(LevelId::new(2)));
    }
}
