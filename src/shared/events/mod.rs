use crate::domain::errors::DomainResult;
use crate::domain::events::SystemEvent;
use crate::domain::ports::event_bus::EventBus;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

/// Local in-memory implementation of EventBus
#[derive(Clone)]
pub struct LocalEventBus {
    tx: broadcast::Sender<SystemEvent>,
}

impl LocalEventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl EventBus for LocalEventBus {
    fn publish(&self, event: SystemEvent) -> DomainResult<()> {
        // Nobody listening is not a failure of the publisher
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("No active subscribers for event: {}", e);
        }
        Ok(())
    }

    fn subscribe(&self) -> Pin<Box<dyn Stream<Item = Result<SystemEvent, String>> + Send>> {
        let rx = self.tx.subscribe();
        Box::pin(BroadcastStream::new(rx).map(|item| item.map_err(|e| e.to_string())))
    }
}

impl Default for LocalEventBus {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AgentStatus;

    #[test]
    fn test_event_bus_creation() {
        let bus = LocalEventBus::new(100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_event_publish_subscribe() {
        let bus = LocalEventBus::new(100);
        let mut rx = bus.subscribe();

        bus.publish(SystemEvent::AgentStatusChanged {
            agent_id: "agent-1".to_string(),
            old_status: AgentStatus::Available,
            new_status: AgentStatus::Away,
            timestamp: "2026-10-19T10:00:00Z".to_string(),
            reason: "activity_monitor".to_string(),
        })
        .unwrap();

        match rx.next().await.unwrap().unwrap() {
            SystemEvent::AgentStatusChanged {
                agent_id,
                new_status,
                ..
            } => {
                assert_eq!(agent_id, "agent-1");
                assert_eq!(new_status, AgentStatus::Away);
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_publish_without_subscribers_succeeds() {
        let bus = LocalEventBus::default();
        let result = bus.publish(SystemEvent::RoutingMethodChanged {
            previous: None,
            current: "Auto_Selection".to_string(),
            timestamp: "2026-10-19T10:00:00Z".to_string(),
        });
        assert!(result.is_ok());
    }
}
