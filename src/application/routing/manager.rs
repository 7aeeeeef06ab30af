use super::RoutingMethod;
use crate::domain::entities::Conversation;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::events::SystemEvent;
use crate::domain::ports::conversation_queue::ConversationQueue;
use crate::domain::ports::event_bus::EventBus;
use crate::domain::ports::time_service::TimeService;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Registry of routing methods with exactly one of them active at a time
pub struct RoutingManager {
    methods: RwLock<HashMap<String, Arc<dyn RoutingMethod>>>,
    /// Held for the whole swap so concurrent swaps serialize
    active: Mutex<Option<Arc<dyn RoutingMethod>>>,
    queue: Arc<dyn ConversationQueue>,
    event_bus: Arc<dyn EventBus>,
    time: Arc<dyn TimeService>,
}

impl RoutingManager {
    pub fn new(
        queue: Arc<dyn ConversationQueue>,
        event_bus: Arc<dyn EventBus>,
        time: Arc<dyn TimeService>,
    ) -> Self {
        Self {
            methods: RwLock::new(HashMap::new()),
            active: Mutex::new(None),
            queue,
            event_bus,
            time,
        }
    }

    /// Register under the method's own name, replacing any previous registration
    pub fn register_method(&self, method: Arc<dyn RoutingMethod>) {
        let name = method.name().to_string();
        tracing::debug!("Registered routing method {}", name);
        self.methods.write().insert(name, method);
    }

    pub fn registered_methods(&self) -> Vec<String> {
        let mut names: Vec<_> = self.methods.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn active_method_name(&self) -> Option<String> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|method| method.name().to_string())
    }

    /// Swap the active method: the previous one is fully stopped before the
    /// new one starts. Unknown names leave the current method running.
    pub async fn set_active_method(&self, name: &str) -> DomainResult<()> {
        let next = self.methods.read().get(name).cloned().ok_or_else(|| {
            DomainError::Configuration(format!("Unknown routing method: {}", name))
        })?;

        let mut active = self.active.lock().await;
        if let Some(current) = active.as_ref() {
            if Arc::ptr_eq(current, &next) {
                tracing::debug!("Routing method {} already active", name);
                return Ok(());
            }
        }

        let previous = active.take();
        let previous_name = previous.as_ref().map(|m| m.name().to_string());
        if let Some(previous) = previous {
            tracing::info!("Stopping routing method {}", previous.name());
            previous.stop_queue().await;
        }

        next.start_queue().await;
        *active = Some(next);
        tracing::info!(
            "Routing method changed from {} to {}",
            previous_name.as_deref().unwrap_or("none"),
            name
        );

        let event = SystemEvent::RoutingMethodChanged {
            previous: previous_name,
            current: name.to_string(),
            timestamp: self.time.now().to_rfc3339(),
        };
        if let Err(e) = self.event_bus.publish(event) {
            tracing::warn!("Failed to publish routing method change: {}", e);
        }
        Ok(())
    }

    /// Queue a conversation and give the active method an immediate chance at it.
    /// Returns the agent when it was assigned right away.
    pub async fn delegate(&self, conversation: Conversation) -> DomainResult<Option<String>> {
        self.queue.enqueue(conversation.clone()).await?;

        let event = SystemEvent::ConversationQueued {
            conversation_id: conversation.id.clone(),
            room_id: conversation.room_id.clone(),
            department_id: conversation.department_id.clone(),
            timestamp: self.time.now().to_rfc3339(),
        };
        if let Err(e) = self.event_bus.publish(event) {
            tracing::warn!("Failed to publish queued conversation: {}", e);
        }

        // Holding the lock keeps a swap from stopping the method mid-assignment
        let active = self.active.lock().await;
        match active.as_ref() {
            Some(method) => method.assign(&conversation).await,
            None => {
                tracing::debug!(
                    "No active routing method, conversation {} stays queued",
                    conversation.id
                );
                Ok(None)
            }
        }
    }

    /// Stop and detach the active method
    pub async fn stop(&self) {
        let mut active = self.active.lock().await;
        if let Some(method) = active.take() {
            method.stop_queue().await;
            tracing::info!("Routing method {} stopped", method.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::memory::InMemoryDatabase;
    use crate::infrastructure::runtime::tokio::TokioTimeService;
    use crate::shared::events::LocalEventBus;
    use async_trait::async_trait;

    struct Recorder {
        name: String,
        log: Arc<parking_lot::Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl RoutingMethod for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        async fn start_queue(&self) {
            self.log.lock().push(format!("start:{}", self.name));
        }

        async fn stop_queue(&self) {
            self.log.lock().push(format!("stop:{}", self.name));
        }

        async fn assign(&self, _conversation: &Conversation) -> DomainResult<Option<String>> {
            Ok(None)
        }
    }

    fn manager_with(names: &[&str]) -> (RoutingManager, Arc<parking_lot::Mutex<Vec<String>>>) {
        let db = InMemoryDatabase::new();
        let manager = RoutingManager::new(
            Arc::new(db),
            Arc::new(LocalEventBus::new(16)),
            Arc::new(TokioTimeService),
        );
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));
        for name in names {
            manager.register_method(Arc::new(Recorder {
                name: name.to_string(),
                log: log.clone(),
            }));
        }
        (manager, log)
    }

    #[tokio::test]
    async fn test_swap_stops_previous_before_starting_next() {
        let (manager, log) = manager_with(&["A", "B"]);

        manager.set_active_method("A").await.unwrap();
        manager.set_active_method("B").await.unwrap();

        assert_eq!(*log.lock(), vec!["start:A", "stop:A", "start:B"]);
        assert_eq!(manager.active_method_name().await.as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn test_reactivating_same_method_is_noop() {
        let (manager, log) = manager_with(&["A"]);

        manager.set_active_method("A").await.unwrap();
        manager.set_active_method("A").await.unwrap();

        assert_eq!(*log.lock(), vec!["start:A"]);
    }

    #[tokio::test]
    async fn test_unknown_method_keeps_current() {
        let (manager, log) = manager_with(&["A"]);
        manager.set_active_method("A").await.unwrap();

        let err = manager.set_active_method("Nope").await.unwrap_err();

        assert!(matches!(err, DomainError::Configuration(_)));
        assert_eq!(manager.active_method_name().await.as_deref(), Some("A"));
        assert_eq!(*log.lock(), vec!["start:A"]);
    }

    #[tokio::test]
    async fn test_delegate_without_active_method_queues() {
        let db = InMemoryDatabase::new();
        let manager = RoutingManager::new(
            Arc::new(db.clone()),
            Arc::new(LocalEventBus::new(16)),
            Arc::new(TokioTimeService),
        );

        let assigned = manager
            .delegate(Conversation::new("room-1".to_string(), None))
            .await
            .unwrap();

        assert!(assigned.is_none());
        assert_eq!(db.list_pending().await.unwrap().len(), 1);
    }
}
