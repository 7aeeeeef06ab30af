use crate::domain::ports::connection_probe::{ConnectionProbe, Liveness};
use crate::domain::ports::notification_sender::NotificationSender;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{error::TrySendError, Sender};
use tokio::time::Instant;

/// Message pushed to a connected client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Shown only to the recipient and never stored
    Ephemeral { room_id: String, message: String },
}

/// Trait for managing real-time connections
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    /// Add a new connection for a user
    async fn add_connection(&self, user_id: &str, sender: Sender<ClientEvent>);

    /// Remove a connection for a user
    async fn remove_connection(&self, user_id: &str);

    /// Record client activity (messages, heartbeats) for a user
    async fn touch(&self, user_id: &str);
}

struct Connection {
    sender: Sender<ClientEvent>,
    last_activity: Instant,
}

/// In-memory connection table; connections idle longer than `idle_timeout`
/// are reported as idle to the activity monitor
#[derive(Clone)]
pub struct InMemoryConnectionManager {
    connections: Arc<Mutex<HashMap<String, Connection>>>,
    idle_timeout: Duration,
}

impl InMemoryConnectionManager {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            connections: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    fn try_deliver(&self, user_id: &str, event: ClientEvent) -> Result<(), String> {
        let connections = self.connections.lock();
        let connection = connections
            .get(user_id)
            .ok_or_else(|| format!("User {} is not connected", user_id))?;

        connection.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => format!("Outbound queue of {} is full", user_id),
            TrySendError::Closed(_) => format!("Connection of {} is closed", user_id),
        })
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, user_id: &str, sender: Sender<ClientEvent>) {
        self.connections.lock().insert(
            user_id.to_string(),
            Connection {
                sender,
                last_activity: Instant::now(),
            },
        );
        tracing::debug!("User {} connected", user_id);
    }

    async fn remove_connection(&self, user_id: &str) {
        if self.connections.lock().remove(user_id).is_some() {
            tracing::debug!("User {} disconnected", user_id);
        }
    }

    async fn touch(&self, user_id: &str) {
        if let Some(connection) = self.connections.lock().get_mut(user_id) {
            connection.last_activity = Instant::now();
        }
    }
}

#[async_trait]
impl ConnectionProbe for InMemoryConnectionManager {
    async fn liveness(&self, user_id: &str) -> Liveness {
        let connections = self.connections.lock();
        match connections.get(user_id) {
            Some(c) if c.sender.is_closed() => Liveness::Disconnected,
            Some(c) if c.last_activity.elapsed() > self.idle_timeout => Liveness::Idle,
            Some(_) => Liveness::Active,
            None => Liveness::Disconnected,
        }
    }
}

impl NotificationSender for InMemoryConnectionManager {
    fn broadcast_ephemeral(&self, user_id: &str, room_id: &str, message: &str) -> Result<(), String> {
        self.try_deliver(
            user_id,
            ClientEvent::Ephemeral {
                room_id: room_id.to_string(),
                message: message.to_string(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn manager() -> InMemoryConnectionManager {
        InMemoryConnectionManager::new(Duration::from_secs(300))
    }

    #[tokio::test]
    async fn test_in_memory_add_and_remove_connection() {
        let manager = manager();
        let (tx, _rx) = mpsc::channel(10);

        manager.add_connection("user1", tx).await;
        assert_eq!(manager.liveness("user1").await, Liveness::Active);
        assert_eq!(manager.liveness("user2").await, Liveness::Disconnected);

        manager.remove_connection("user1").await;
        assert_eq!(manager.liveness("user1").await, Liveness::Disconnected);
    }

    #[tokio::test]
    async fn test_ephemeral_delivery() {
        let manager = manager();
        let (tx, mut rx) = mpsc::channel(10);
        manager.add_connection("user1", tx).await;

        manager
            .broadcast_ephemeral("user1", "room1", "not allowed")
            .unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            ClientEvent::Ephemeral {
                room_id: "room1".to_string(),
                message: "not allowed".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_send_to_disconnected_user_fails() {
        let manager = manager();
        let err = manager
            .broadcast_ephemeral("ghost", "room1", "hello")
            .unwrap_err();
        assert!(err.contains("not connected"));
    }

    #[tokio::test]
    async fn test_full_queue_does_not_block() {
        let manager = manager();
        let (tx, _rx) = mpsc::channel(1);
        manager.add_connection("user1", tx).await;

        manager.broadcast_ephemeral("user1", "room1", "first").unwrap();
        assert!(manager.broadcast_ephemeral("user1", "room1", "second").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_liveness_tracks_idle_and_closed_connections() {
        let manager = manager();
        let (tx, rx) = mpsc::channel(10);
        manager.add_connection("user1", tx).await;
        assert_eq!(manager.liveness("user1").await, Liveness::Active);

        tokio::time::advance(Duration::from_secs(301)).await;
        assert_eq!(manager.liveness("user1").await, Liveness::Idle);

        manager.touch("user1").await;
        assert_eq!(manager.liveness("user1").await, Liveness::Active);

        drop(rx);
        assert_eq!(manager.liveness("user1").await, Liveness::Disconnected);
        assert_eq!(manager.liveness("nobody").await, Liveness::Disconnected);
    }
}
