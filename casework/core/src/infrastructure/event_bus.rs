// Event Bus Implementation - Pub/Sub for Case Events
//
// Provides in-memory event streaming using tokio broadcast channels.
// Subscribers (audit sinks, notification fan-out, the refresh sweeper's
// observers) receive events after the owning transition was persisted.
//
// In-memory only: events are lost on restart. The append-only history on
// the aggregate remains the durable audit record.

use crate::domain::events::CaseEvent;
use crate::domain::work_item::WorkItemId;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Event bus for publishing and subscribing to case events
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<CaseEvent>>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    /// Capacity determines how many events can be buffered before dropping old ones
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create event bus with default capacity (1000)
    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    /// Publish a case event to all subscribers
    pub fn publish(&self, event: CaseEvent) {
        debug!("Publishing event: {}", event.kind());

        // send() returns the number of receivers that received the message
        let receiver_count = self.sender.send(event).unwrap_or(0);

        if receiver_count == 0 {
            debug!("No subscribers listening to event");
        }
    }

    /// Subscribe to all case events
    pub fn subscribe(&self) -> EventReceiver {
        let receiver = self.sender.subscribe();
        EventReceiver { receiver }
    }

    /// Subscribe and filter for a single work item
    /// Useful for streaming the activity of one case to a client
    pub fn subscribe_work_item(&self, work_item_id: WorkItemId) -> WorkItemEventReceiver {
        let receiver = self.sender.subscribe();
        WorkItemEventReceiver {
            receiver,
            work_item_id,
        }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiver for all case events
pub struct EventReceiver {
    receiver: broadcast::Receiver<CaseEvent>,
}

impl EventReceiver {
    /// Receive the next event (blocks until event is available)
    pub async fn recv(&mut self) -> Result<CaseEvent, EventBusError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => EventBusError::Closed,
            broadcast::error::RecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<CaseEvent, EventBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => EventBusError::Empty,
            broadcast::error::TryRecvError::Closed => EventBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }
}

/// Receiver for the events of one work item (filtered)
pub struct WorkItemEventReceiver {
    receiver: broadcast::Receiver<CaseEvent>,
    work_item_id: WorkItemId,
}

impl WorkItemEventReceiver {
    /// Receive the next event for the subscribed work item
    /// Events belonging to other items are skipped
    pub async fn recv(&mut self) -> Result<CaseEvent, EventBusError> {
        loop {
            let event = self.receiver.recv().await.map_err(|e| match e {
                broadcast::error::RecvError::Closed => EventBusError::Closed,
                broadcast::error::RecvError::Lagged(n) => {
                    warn!("Event receiver lagged by {} events", n);
                    EventBusError::Lagged(n)
                }
            })?;

            if event.work_item_id() == self.work_item_id {
                return Ok(event);
            }
        }
    }
}

/// Errors that can occur when receiving events
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        let work_item_id = WorkItemId::new();
        event_bus.publish(CaseEvent::ReviewStarted {
            work_item_id,
            started_at: Utc::now(),
        });

        let received = receiver.recv().await.unwrap();
        match received {
            CaseEvent::ReviewStarted { work_item_id: id, .. } => {
                assert_eq!(id, work_item_id);
            }
            _ => panic!("Wrong event type received"),
        }
    }

    #[tokio::test]
    async fn test_work_item_event_filtering() {
        let event_bus = EventBus::new(10);
        let work_item_id = WorkItemId::new();
        let other_work_item_id = WorkItemId::new();

        let mut receiver = event_bus.subscribe_work_item(work_item_id);

        // Event for a different item (should be filtered out)
        event_bus.publish(CaseEvent::ReviewStarted {
            work_item_id: other_work_item_id,
            started_at: Utc::now(),
        });

        // Event for our item (should be received)
        event_bus.publish(CaseEvent::WorkItemCancelled {
            work_item_id,
            cancelled_at: Utc::now(),
        });

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.work_item_id(), work_item_id);
        assert_eq!(received.kind(), "work_item_cancelled");
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        assert_eq!(event_bus.subscriber_count(), 2);

        event_bus.publish(CaseEvent::WorkItemUnassigned {
            work_item_id: WorkItemId::new(),
            unassigned_at: Utc::now(),
        });

        let _ = receiver1.recv().await.unwrap();
        let _ = receiver2.recv().await.unwrap();
    }

    #[tokio::test]
    async fn test_try_recv_on_empty_bus() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        assert!(matches!(receiver.try_recv(), Err(EventBusError::Empty)));
    }

    #[tokio::test]
    async fn test_slow_subscriber_observes_lag() {
        let event_bus = EventBus::new(2);
        let mut receiver = event_bus.subscribe();

        for _ in 0..10 {
            event_bus.publish(CaseEvent::ReviewStarted {
                work_item_id: WorkItemId::new(),
                started_at: Utc::now(),
            });
        }

        assert!(matches!(receiver.recv().await, Err(EventBusError::Lagged(_))));

        // After reporting the lag the receiver resumes from the oldest retained event
        assert!(receiver.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_recv_after_bus_dropped_reports_closed() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();
        drop(event_bus);

        assert!(matches!(receiver.recv().await, Err(EventBusError::Closed)));
    }
}
