//! Domain layer for the approval workflow system.
//!
//! This crate provides the approval process state machine:
//! - `ProcessStatus` lifecycle states and transition predicates
//! - `ProcessDefinition` describing a process template's levels and topology
//! - The level progression rules for sequential and parallel processes
//! - `ApprovalProcessInstance`, the persisted per-request saga state
//!
//! Everything here is pure: instances are mutated only through command
//! methods that validate the current status first, and the progression
//! rules are functions of the instance's fields alone. Persistence and
//! messaging live in the `instance-store` and `saga` crates.

pub mod definition;
pub mod error;
pub mod instance;
pub mod progression;
pub mod status;
pub mod value_objects;

pub use common::CorrelationId;
pub use definition::ProcessDefinition;
pub use error::ProcessError;
pub use instance::{ApprovalProcessInstance, RecordInfo};
pub use progression::{LevelTopology, Progress};
pub use status::ProcessStatus;
pub use value_objects::{LevelId, OrgStructureId, ProcessId, RecordId, UserId};
