use async_trait::async_trait;

use crate::{CorrelationId, InstanceRecord, Result, Version};

/// Options for saving an instance record.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Expected version of the record for optimistic concurrency control.
    /// If None, no version check is performed (use with caution).
    pub expected_version: Option<Version>,
}

impl SaveOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the record to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Creates options expecting the record to not exist yet.
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// Core trait for instance store implementations.
///
/// The store is a key→record table: one record per correlation ID, written
/// whole on every save. All implementations must be thread-safe.
#[async_trait]
pub trait InstanceStore: Send + Sync {
    /// Loads the record for a correlation ID.
    ///
    /// Returns None if no instance has been stored under that ID.
    async fn load(&self, correlation_id: CorrelationId) -> Result<Option<InstanceRecord>>;

    /// Creates or overwrites the record for a correlation ID atomically.
    ///
    /// If `options.expected_version` is set, the write fails with
    /// `StoreError::Conflict` unless the stored version matches
    /// (`Version::initial()` for an absent record). On success the record
    /// is written at the next version, which is returned.
    async fn save(
        &self,
        correlation_id: CorrelationId,
        payload: serde_json::Value,
        options: SaveOptions,
    ) -> Result<Version>;
}

/// Extension trait providing convenience methods for instance stores.
#[async_trait]
pub trait InstanceStoreExt: InstanceStore {
    /// Checks whether a record exists for the correlation ID.
    async fn exists(&self, correlation_id: CorrelationId) -> Result<bool> {
        Ok(self.load(correlation_id).await?.is_some())
    }

    /// Returns the stored version for a correlation ID, if any.
    async fn version_of(&self, correlation_id: CorrelationId) -> Result<Option<Version>> {
        Ok(self.load(correlation_id).await?.map(|r| r.version))
    }
}

// Blanket implementation for all InstanceStore implementations
impl<T: InstanceStore + ?Sized> InstanceStoreExt for T {}
