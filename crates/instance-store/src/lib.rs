//! Durable keyed storage for approval process instances.
//!
//! The store maps a correlation ID to a single versioned record holding the
//! whole serialized instance. A record is always replaced as a unit, and
//! every write can be guarded with an expected version, which is the single
//! synchronization point preventing two concurrent events on the same
//! instance from clobbering each other's effect.

pub mod error;
pub mod memory;
pub mod record;
pub mod store;

pub use common::CorrelationId;
pub use error::{Result, StoreError};
pub use memory::InMemoryInstanceStore;
pub use record::{InstanceRecord, Version};
pub use store::{InstanceStore, InstanceStoreExt, SaveOptions};
