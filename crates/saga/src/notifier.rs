//! Status notifier trait and in-memory implementation.
//!
//! Delivery is at-least-once and fire-and-forget from the saga's
//! perspective: subscribers must tolerate duplicate notifications for the
//! same status, and a publish failure never rolls back a persisted
//! transition.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::CorrelationId;
use domain::ProcessStatus;
use thiserror::Error;

use crate::messages::StatusUpdated;

/// Errors raised when publishing a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The transport refused or timed out on the publish.
    #[error("notification transport failure: {0}")]
    Transport(String),
}

/// Trait for publishing status-change notifications.
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    /// Publishes a status update to interested consumers.
    async fn publish(&self, update: StatusUpdated) -> Result<(), NotifyError>;
}

#[derive(Debug, Default)]
struct InMemoryNotifierState {
    published: Vec<StatusUpdated>,
    fail_on_publish: bool,
}

/// In-memory notifier that records published updates, for tests and
/// embedded deployments.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    state: Arc<RwLock<InMemoryNotifierState>>,
}

impl InMemoryNotifier {
    /// Creates a new in-memory notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the notifier to fail publishes.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().unwrap().fail_on_publish = fail;
    }

    /// Returns every update published so far, in publish order.
    pub fn published(&self) -> Vec<StatusUpdated> {
        self.state.read().unwrap().published.clone()
    }

    /// Returns the number of published updates.
    pub fn published_count(&self) -> usize {
        self.state.read().unwrap().published.len()
    }

    /// Returns the most recently published status for an instance.
    pub fn last_status(&self, correlation_id: CorrelationId) -> Option<ProcessStatus> {
        self.state
            .read()
            .unwrap()
            .published
            .iter()
            .rev()
            .find(|u| u.correlation_id == correlation_id)
            .map(|u| u.status)
    }
}

#[async_trait]
impl StatusNotifier for InMemoryNotifier {
    async fn publish(&self, update: StatusUpdated) -> Result<(), NotifyError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_publish {
            return Err(NotifyError::Transport("publish disabled".to_string()));
        }

        state.published.push(update);
        Ok(())
    }
}
