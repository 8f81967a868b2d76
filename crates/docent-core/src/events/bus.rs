//! Fire-and-forget pipeline event fan-out over a tokio broadcast channel.
//!
//! Emitting never blocks and never fails. A subscriber that falls behind
//! skips the events it missed instead of slowing the pipeline down.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use crate::events::PipelineEvent;

const DEFAULT_CAPACITY: usize = 256;

/// Shared handle to the pipeline event channel. Cloning is cheap; every clone
/// publishes to the same subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Bus buffering at most `capacity` undelivered events per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&self) -> EventSubscriber {
        EventSubscriber {
            receiver: self.sender.subscribe(),
            subject: None,
        }
    }

    /// Receive only events about one document or query.
    pub fn subscribe_to(&self, subject_id: impl Into<String>) -> EventSubscriber {
        EventSubscriber {
            receiver: self.sender.subscribe(),
            subject: Some(subject_id.into()),
        }
    }

    /// Publish `event`. Dropped silently when nobody listens.
    pub fn emit(&self, event: PipelineEvent) {
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            tracing::trace!(
                event_type = event.event_type(),
                subject = event.subject_id(),
                "Event dropped, no subscribers"
            );
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of an [`EventBus`], optionally scoped to one subject.
pub struct EventSubscriber {
    receiver: broadcast::Receiver<PipelineEvent>,
    subject: Option<String>,
}

impl EventSubscriber {
    fn wants(&self, event: &PipelineEvent) -> bool {
        self.subject
            .as_deref()
            .map_or(true, |subject| event.subject_id() == subject)
    }

    /// Next matching event, or `None` once every bus handle is dropped.
    pub async fn recv(&mut self) -> Option<PipelineEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.wants(&event) => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Closed) => return None,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event subscriber fell behind");
                }
            }
        }
    }

    /// Next matching event already buffered, without waiting.
    pub fn try_recv(&mut self) -> Option<PipelineEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.wants(&event) => return Some(event),
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentStatus;

    #[tokio::test]
    async fn test_subscriber_sees_emitted_event() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();

        bus.emit(PipelineEvent::status_changed("doc-1", DocumentStatus::Processing));

        let received = sub.recv().await.unwrap();
        assert_eq!(received.subject_id(), "doc-1");
        assert_eq!(received.event_type(), "document.status");
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_a_copy() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.clone().subscribe();

        bus.emit(PipelineEvent::query_completed("q-1", true));

        assert_eq!(first.recv().await.unwrap().subject_id(), "q-1");
        assert_eq!(second.recv().await.unwrap().subject_id(), "q-1");
    }

    #[tokio::test]
    async fn test_scoped_subscriber_skips_other_subjects() {
        let bus = EventBus::new();
        let mut scoped = bus.subscribe_to("doc-2");

        bus.emit(PipelineEvent::progress("doc-1", 30, "stored"));
        bus.emit(PipelineEvent::progress("doc-2", 70, "extracted"));

        assert_eq!(scoped.recv().await.unwrap().subject_id(), "doc-2");
        assert!(scoped.try_recv().is_none());
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new();
        bus.emit(PipelineEvent::analysis_completed("doc-1", 4));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_try_recv_is_non_blocking() {
        let bus = EventBus::with_capacity(4);
        let mut sub = bus.subscribe();
        assert!(sub.try_recv().is_none());
        bus.emit(PipelineEvent::progress("doc-1", 50, "extract"));
        assert!(sub.try_recv().is_some());
    }
}
