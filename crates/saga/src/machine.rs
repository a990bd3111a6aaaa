//! The approval saga state machine.
//!
//! Stateless between events: every inbound event is one
//! load→validate→progress→persist→notify cycle against the instance
//! store, so any number of hosts can run the machine side by side with
//! the store as the single source of truth.

use std::time::Instant;

use common::CorrelationId;
use domain::{ApprovalProcessInstance, ProcessError, ProcessStatus, RecordInfo, UserId};
use instance_store::{InstanceStore, SaveOptions, StoreError};

use crate::config::SagaConfig;
use crate::directory::ProcessDirectory;
use crate::error::SagaError;
use crate::messages::{InboundEvent, RequestData, StatusUpdated};
use crate::notifier::StatusNotifier;

/// Drives approval process instances in response to inbound events.
///
/// Writes are guarded by the store's version check; on a conflict the
/// machine reloads and re-validates, so an event that raced against a
/// terminal transition resolves to an invalid transition instead of a
/// lost update.
pub struct ApprovalSaga<S, D, N>
where
    S: InstanceStore,
    D: ProcessDirectory,
    N: StatusNotifier,
{
    store: S,
    directory: D,
    notifier: N,
    config: SagaConfig,
}

impl<S, D, N> ApprovalSaga<S, D, N>
where
    S: InstanceStore,
    D: ProcessDirectory,
    N: StatusNotifier,
{
    /// Creates a saga with the default configuration.
    pub fn new(store: S, directory: D, notifier: N) -> Self {
        Self::with_config(store, directory, notifier, SagaConfig::default())
    }

    /// Creates a saga with an explicit configuration.
    pub fn with_config(store: S, directory: D, notifier: N, config: SagaConfig) -> Self {
        Self {
            store,
            directory,
            notifier,
            config,
        }
    }

    /// Handles one inbound event, returning the instance status after the
    /// transition.
    ///
    /// Business-rule violations come back as errors for the router to
    /// absorb; a duplicate Request is a no-op returning the existing
    /// instance's status.
    #[tracing::instrument(
        skip(self, event),
        fields(correlation_id = %event.correlation_id(), event_type = event.event_type())
    )]
    pub async fn handle(&self, event: InboundEvent) -> Result<ProcessStatus, SagaError> {
        metrics::counter!("approval_events_total", "event" => event.event_type()).increment(1);
        let started = Instant::now();

        let result = match event {
            InboundEvent::Request(data) => self.handle_request(data).await,
            InboundEvent::Approve(data) => {
                let level = data.level_id;
                self.execute(data.correlation_id, data.user_id, move |instance| {
                    instance.approve(level)
                })
                .await
            }
            InboundEvent::Reject(data) => {
                let level = data.level_id;
                self.execute(data.correlation_id, data.user_id, move |instance| {
                    instance.reject(level)
                })
                .await
            }
            InboundEvent::Return(data) => {
                let level = data.level_id;
                self.execute(data.correlation_id, data.user_id, move |instance| {
                    instance.return_for_info(level)
                })
                .await
            }
            InboundEvent::Resubmit(data) => {
                self.execute(data.correlation_id, data.user_id, |instance| {
                    instance.resubmit()
                })
                .await
            }
            InboundEvent::Cancel(data) => {
                self.execute(data.correlation_id, data.user_id, |instance| {
                    instance.cancel()
                })
                .await
            }
        };

        metrics::histogram!("approval_event_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        result
    }

    /// Loads an instance by correlation ID.
    pub async fn instance(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<Option<ApprovalProcessInstance>, SagaError> {
        match self.store.load(correlation_id).await? {
            Some(record) => Ok(Some(serde_json::from_value(record.payload)?)),
            None => Ok(None),
        }
    }

    /// Opens a new instance from a request event.
    async fn handle_request(&self, data: RequestData) -> Result<ProcessStatus, SagaError> {
        let correlation_id = data.correlation_id;

        // Redelivered request for an instance that already exists: no-op.
        if let Some(record) = self.store.load(correlation_id).await? {
            let instance: ApprovalProcessInstance = serde_json::from_value(record.payload)?;
            tracing::debug!(status = %instance.status(), "duplicate request ignored");
            return Ok(instance.status());
        }

        let definition = self
            .directory
            .definition(data.process_id)
            .await?
            .ok_or(SagaError::UnknownProcess(data.process_id))?;

        let instance = ApprovalProcessInstance::open(
            correlation_id,
            &definition,
            data.org_structure_id,
            data.user_id,
            RecordInfo {
                record_id: data.record_id,
                record_number: data.record_number,
                record_description: data.description,
                entry_uri: data.entry_uri,
                source_uri: data.source_uri,
                approvals_uri: data.approvals_uri,
            },
        );
        let payload = serde_json::to_value(&instance)?;

        match self
            .store
            .save(correlation_id, payload, SaveOptions::expect_new())
            .await
        {
            Ok(_) => {
                tracing::info!(process_id = %instance.process_id(), "approval process opened");
                self.notify(StatusUpdated::new(correlation_id, data.user_id, instance.status()))
                    .await;
                Ok(instance.status())
            }
            Err(StoreError::Conflict { .. }) => {
                // A racing duplicate won the create; adopt its instance.
                let record = self
                    .store
                    .load(correlation_id)
                    .await?
                    .ok_or(SagaError::UnknownInstance(correlation_id))?;
                let existing: ApprovalProcessInstance = serde_json::from_value(record.payload)?;
                tracing::debug!(status = %existing.status(), "duplicate request lost create race");
                Ok(existing.status())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Runs one lifecycle command through the load-apply-save cycle,
    /// retrying on version conflicts up to the configured attempt cap.
    async fn execute<F>(
        &self,
        correlation_id: CorrelationId,
        user_id: UserId,
        command: F,
    ) -> Result<ProcessStatus, SagaError>
    where
        F: Fn(&mut ApprovalProcessInstance) -> Result<ProcessStatus, ProcessError>,
    {
        let attempts = self.config.max_persist_attempts;

        for attempt in 1..=attempts {
            let record = self
                .store
                .load(correlation_id)
                .await?
                .ok_or(SagaError::UnknownInstance(correlation_id))?;
            let mut instance: ApprovalProcessInstance = serde_json::from_value(record.payload)?;

            // Re-validates on every reload: if a concurrent event already
            // drove the instance terminal, the command fails here and the
            // router treats the event as a no-op.
            let status = command(&mut instance)?;
            let payload = serde_json::to_value(&instance)?;

            match self
                .store
                .save(
                    correlation_id,
                    payload,
                    SaveOptions::expect_version(record.version),
                )
                .await
            {
                Ok(_) => {
                    tracing::info!(%status, "transition applied");
                    if status == ProcessStatus::Approved {
                        metrics::counter!("approval_completed").increment(1);
                    }
                    self.notify(StatusUpdated::new(correlation_id, user_id, status))
                        .await;
                    return Ok(status);
                }
                Err(StoreError::Conflict { .. }) => {
                    tracing::debug!(attempt, "version conflict, reloading");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(SagaError::PersistenceConflict {
            correlation_id,
            attempts,
        })
    }

    /// Publishes a status notification.
    ///
    /// The transition is already persisted and authoritative; a publish
    /// failure is logged and counted, never propagated.
    async fn notify(&self, update: StatusUpdated) {
        let correlation_id = update.correlation_id;
        if let Err(e) = self.notifier.publish(update).await {
            metrics::counter!("approval_notify_failures_total").increment(1);
            tracing::warn!(%correlation_id, error = %e, "status notification failed");
        }
    }
}
