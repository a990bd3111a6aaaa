//! Inbound event router.
//!
//! Guarantees at-most-one-in-flight per correlation ID: events for one
//! instance are applied strictly in the order they are accepted, while
//! events for different instances process concurrently without limit.
//! The store's version check remains as a safety net for fleets where
//! another router instance may touch the same correlation ID.

use std::collections::HashMap;
use std::sync::Arc;

use common::CorrelationId;
use domain::ProcessStatus;
use instance_store::InstanceStore;
use tokio::sync::Mutex;

use crate::directory::ProcessDirectory;
use crate::error::SagaError;
use crate::machine::ApprovalSaga;
use crate::messages::InboundEvent;
use crate::notifier::StatusNotifier;

/// Outcome of dispatching one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event was applied; the instance is now in this status.
    Applied(ProcessStatus),

    /// The event was a business no-op (unknown instance, or inapplicable
    /// to the current status); logged and dropped, not redelivered.
    Discarded,
}

/// Routes inbound events to the saga, serializing per correlation ID.
pub struct EventRouter<S, D, N>
where
    S: InstanceStore,
    D: ProcessDirectory,
    N: StatusNotifier,
{
    saga: Arc<ApprovalSaga<S, D, N>>,
    in_flight: Mutex<HashMap<CorrelationId, Arc<Mutex<()>>>>,
}

impl<S, D, N> EventRouter<S, D, N>
where
    S: InstanceStore,
    D: ProcessDirectory,
    N: StatusNotifier,
{
    /// Creates a router over a shared saga.
    pub fn new(saga: Arc<ApprovalSaga<S, D, N>>) -> Self {
        Self {
            saga,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the underlying saga.
    pub fn saga(&self) -> &Arc<ApprovalSaga<S, D, N>> {
        &self.saga
    }

    /// Dispatches one inbound event.
    ///
    /// Business-rule violations are absorbed here: redelivered or stale
    /// events must never bounce back to the transport as failures.
    /// Infrastructure errors propagate so the transport can redeliver.
    #[tracing::instrument(
        skip(self, event),
        fields(correlation_id = %event.correlation_id(), event_type = event.event_type())
    )]
    pub async fn dispatch(&self, event: InboundEvent) -> Result<DispatchOutcome, SagaError> {
        let correlation_id = event.correlation_id();

        let gate = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight.entry(correlation_id).or_default().clone()
        };

        let result = {
            let _guard = gate.lock().await;
            self.saga.handle(event).await
        };

        self.release(correlation_id, &gate).await;

        match result {
            Ok(status) => Ok(DispatchOutcome::Applied(status)),
            Err(e) if e.is_business() => {
                metrics::counter!("approval_events_discarded_total").increment(1);
                tracing::warn!(%correlation_id, error = %e, "event discarded");
                Ok(DispatchOutcome::Discarded)
            }
            Err(e) => Err(e),
        }
    }

    /// Drops the per-instance gate once no other dispatch holds it.
    async fn release(&self, correlation_id: CorrelationId, gate: &Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().await;
        // Two strong references left means the map entry plus our local
        // clone; cloning from the map requires the lock we are holding.
        if Arc::strong_count(gate) == 2 {
            in_flight.remove(&correlation_id);
        }
    }

    /// Returns the number of correlation IDs with a live gate.
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}
