use crate::domain::ports::setting_watcher::SettingWatcher;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

/// Process-local settings store that streams changes to watchers
#[derive(Clone)]
pub struct InMemorySettings {
    values: Arc<RwLock<HashMap<String, Value>>>,
    tx: broadcast::Sender<(String, Value)>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self {
            values: Arc::new(RwLock::new(HashMap::new())),
            tx,
        }
    }

    /// Store a value and notify watchers of that setting
    pub fn set(&self, name: &str, value: Value) {
        self.values.write().insert(name.to_string(), value.clone());
        tracing::debug!("Setting {} updated", name);
        let _ = self.tx.send((name.to_string(), value));
    }
}

impl Default for InMemorySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingWatcher for InMemorySettings {
    fn watch(&self, name: &str) -> BoxStream<'static, Value> {
        // Subscribe before reading the current value so no change slips in between
        let changes = BroadcastStream::new(self.tx.subscribe());
        let current = self.get(name);
        let name = name.to_string();

        let changes = changes.filter_map(move |item| {
            let name = name.clone();
            async move {
                match item {
                    Ok((changed, value)) if changed == name => Some(value),
                    Ok(_) => None,
                    Err(e) => {
                        tracing::warn!("Setting watcher for {} lagged: {}", name, e);
                        None
                    }
                }
            }
        });

        stream::iter(current).chain(changes).boxed()
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.values.read().get(name).cloned()
    }
}
