//! Typed event delivery from the gradebook to the fan-out runner.

use tokio::sync::mpsc;
use tracing;

use eduhub_core::error::AppError;
use eduhub_core::events::{AcademicEvent, DomainEvent};
use eduhub_core::types::id::UserId;

/// Create a bounded event channel.
pub fn event_channel(capacity: usize) -> (EventPublisher, mpsc::Receiver<DomainEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventPublisher { tx }, rx)
}

/// Sending half of the event channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    tx: mpsc::Sender<DomainEvent>,
}

impl EventPublisher {
    /// Publish an event, waiting for channel capacity.
    ///
    /// Fails only when the runner has stopped; callers should log and carry
    /// on, since the academic record is already committed.
    pub async fn publish(&self, event: DomainEvent) -> Result<(), AppError> {
        let event_id = event.id;
        self.tx.send(event).await.map_err(|_| {
            AppError::service_unavailable(format!(
                "Notification runner stopped, event {event_id} dropped"
            ))
        })?;
        tracing::trace!("Published event {}", event_id);
        Ok(())
    }

    /// Wrap a payload in a [`DomainEvent`] and publish it.
    pub async fn publish_payload(
        &self,
        actor_id: Option<UserId>,
        payload: impl Into<AcademicEvent>,
    ) -> Result<(), AppError> {
        self.publish(DomainEvent::new(actor_id, payload.into())).await
    }

    /// Whether the runner side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
