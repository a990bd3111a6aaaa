//! Approval process saga.
//!
//! This crate orchestrates the multi-party approval workflow: inbound
//! request/approve/reject/return/resubmit/cancel events are routed by
//! correlation ID to a stateless state machine that loads the instance
//! from the store, validates the event against the current status,
//! advances the level progression, persists the whole instance with an
//! optimistic version check, and publishes a status notification.
//!
//! Delivery is at-least-once: duplicate or stale events resolve to
//! invalid transitions that the router logs and discards, so redelivery
//! is always a safe no-op.

pub mod config;
pub mod directory;
pub mod error;
pub mod machine;
pub mod messages;
pub mod notifier;
pub mod router;

pub use config::SagaConfig;
pub use directory::{DirectoryError, InMemoryProcessDirectory, ProcessDirectory};
pub use error::SagaError;
pub use machine::ApprovalSaga;
pub use messages::{
    ApproveData, CancelData, InboundEvent, RejectData, RequestData, ResubmitData, ReturnData,
    StatusUpdated,
};
pub use notifier::{InMemoryNotifier, NotifyError, StatusNotifier};
pub use router::{DispatchOutcome, EventRouter};
