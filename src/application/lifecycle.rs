use crate::domain::ports::task_spawner::{TaskCompletion, TaskSpawner};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Lifecycle of a component owning a background loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Stopped,
    Starting,
    Running,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Stopped => write!(f, "stopped"),
            LifecycleState::Starting => write!(f, "starting"),
            LifecycleState::Running => write!(f, "running"),
        }
    }
}

/// A spawned loop that stops cooperatively
pub struct BackgroundTask {
    name: String,
    cancel: CancellationToken,
    completion: TaskCompletion,
}

impl BackgroundTask {
    /// Spawn `body` with a fresh cancellation token; the body must return once
    /// the token is cancelled
    pub fn spawn<F, Fut>(spawner: &dyn TaskSpawner, name: &str, body: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let completion = spawner.spawn(name, Box::pin(body(cancel.clone())));
        Self {
            name: name.to_string(),
            cancel,
            completion,
        }
    }

    /// Request cancellation and wait until the loop has exited
    pub async fn stop(self) {
        tracing::debug!(task = %self.name, "Stopping background task");
        self.cancel.cancel();
        self.completion.await;
        tracing::debug!(task = %self.name, "Background task stopped");
    }
}
