use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    CorrelationId, InstanceRecord, Result, StoreError, Version,
    store::{InstanceStore, SaveOptions},
};

/// In-memory instance store implementation.
///
/// Backs the integration tests and embedded deployments; provides the same
/// versioning semantics a durable implementation must honor.
#[derive(Clone, Default)]
pub struct InMemoryInstanceStore {
    records: Arc<RwLock<HashMap<CorrelationId, InstanceRecord>>>,
}

impl InMemoryInstanceStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl InstanceStore for InMemoryInstanceStore {
    async fn load(&self, correlation_id: CorrelationId) -> Result<Option<InstanceRecord>> {
        let records = self.records.read().await;
        Ok(records.get(&correlation_id).cloned())
    }

    async fn save(
        &self,
        correlation_id: CorrelationId,
        payload: serde_json::Value,
        options: SaveOptions,
    ) -> Result<Version> {
        let mut records = self.records.write().await;

        let current_version = records
            .get(&correlation_id)
            .map(|r| r.version)
            .unwrap_or(Version::initial());

        if let Some(expected) = options.expected_version {
            if current_version != expected {
                return Err(StoreError::Conflict {
                    correlation_id,
                    expected,
                    actual: current_version,
                });
            }
        }

        let new_version = current_version.next();
        records.insert(
            correlation_id,
            InstanceRecord {
                correlation_id,
                version: new_version,
                payload,
                updated_at: Utc::now(),
            },
        );

        Ok(new_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(value: i32) -> serde_json::Value {
        serde_json::json!({ "value": value })
    }

    #[tokio::test]
    async fn save_new_record() {
        let store = InMemoryInstanceStore::new();
        let id = CorrelationId::new();

        let version = store
            .save(id, payload(1), SaveOptions::expect_new())
            .await
            .unwrap();
        assert_eq!(version, Version::first());

        let record = store.load(id).await.unwrap().unwrap();
        assert_eq!(record.correlation_id, id);
        assert_eq!(record.version, Version::first());
        assert_eq!(record.payload, payload(1));
    }

    #[tokio::test]
    async fn load_missing_returns_none() {
        let store = InMemoryInstanceStore::new();
        let result = store.load(CorrelationId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn expect_new_conflicts_when_record_exists() {
        let store = InMemoryInstanceStore::new();
        let id = CorrelationId::new();

        store
            .save(id, payload(1), SaveOptions::expect_new())
            .await
            .unwrap();

        let result = store.save(id, payload(2), SaveOptions::expect_new()).await;
        assert!(matches!(
            result,
            Err(StoreError::Conflict {
                expected,
                actual,
                ..
            }) if expected == Version::initial() && actual == Version::first()
        ));

        // Loser's write must not have replaced the record
        let record = store.load(id).await.unwrap().unwrap();
        assert_eq!(record.payload, payload(1));
    }

    #[tokio::test]
    async fn expect_version_success() {
        let store = InMemoryInstanceStore::new();
        let id = CorrelationId::new();

        store
            .save(id, payload(1), SaveOptions::expect_new())
            .await
            .unwrap();

        let version = store
            .save(id, payload(2), SaveOptions::expect_version(Version::first()))
            .await
            .unwrap();
        assert_eq!(version, Version::new(2));

        let record = store.load(id).await.unwrap().unwrap();
        assert_eq!(record.payload, payload(2));
    }

    #[tokio::test]
    async fn expect_version_conflict_on_stale_version() {
        let store = InMemoryInstanceStore::new();
        let id = CorrelationId::new();

        store
            .save(id, payload(1), SaveOptions::expect_new())
            .await
            .unwrap();
        store
            .save(id, payload(2), SaveOptions::expect_version(Version::first()))
            .await
            .unwrap();

        // A writer holding version 1 is now stale
        let result = store
            .save(id, payload(3), SaveOptions::expect_version(Version::first()))
            .await;
        assert!(matches!(result, Err(StoreError::Conflict { .. })));

        let record = store.load(id).await.unwrap().unwrap();
        assert_eq!(record.payload, payload(2));
        assert_eq!(record.version, Version::new(2));
    }

    #[tokio::test]
    async fn unchecked_save_overwrites() {
        let store = InMemoryInstanceStore::new();
        let id = CorrelationId::new();

        store
            .save(id, payload(1), SaveOptions::expect_new())
            .await
            .unwrap();
        let version = store.save(id, payload(9), SaveOptions::new()).await.unwrap();

        assert_eq!(version, Version::new(2));
        let record = store.load(id).await.unwrap().unwrap();
        assert_eq!(record.payload, payload(9));
    }

    #[tokio::test]
    async fn ext_helpers_report_existence_and_version() {
        use crate::store::InstanceStoreExt;

        let store = InMemoryInstanceStore::new();
        let id = CorrelationId::new();

        assert!(!store.exists(id).await.unwrap());
        assert_eq!(store.version_of(id).await.unwrap(), None);

        store
            .save(id, payload(1), SaveOptions::expect_new())
            .await
            .unwrap();

        assert!(store.exists(id).await.unwrap());
        assert_eq!(store.version_of(id).await.unwrap(), Some(Version::first()));
    }

    #[tokio::test]
    async fn record_count_and_clear() {
        let store = InMemoryInstanceStore::new();

        store
            .save(CorrelationId::new(), payload(1), SaveOptions::expect_new())
            .await
            .unwrap();
        store
            .save(CorrelationId::new(), payload(2), SaveOptions::expect_new())
            .await
            .unwrap();
        assert_eq!(store.record_count().await, 2);

        store.clear().await;
        assert_eq!(store.record_count().await, 0);
    }
}
