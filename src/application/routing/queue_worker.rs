use crate::application::lifecycle::BackgroundTask;
use crate::domain::errors::DomainResult;
use crate::domain::ports::conversation_queue::ConversationQueue;
use crate::domain::ports::task_spawner::TaskSpawner;
use crate::domain::ports::time_service::TimeService;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// One pass over the pending queue
#[async_trait]
pub trait QueueProcessor: Send + Sync {
    /// Process pending conversations until done or `cancel` fires.
    /// Cancellation is only honored between conversations.
    async fn process_pending(&self, cancel: &CancellationToken) -> DomainResult<usize>;
}

/// Background loop that drains the queue whenever something is enqueued, and
/// re-reads it on a retry interval for conversations nobody could take yet
pub struct QueueWorker {
    name: String,
    queue: Arc<dyn ConversationQueue>,
    spawner: Arc<dyn TaskSpawner>,
    time: Arc<dyn TimeService>,
    retry_interval: Duration,
    task: Mutex<Option<BackgroundTask>>,
}

impl QueueWorker {
    pub fn new(
        name: impl Into<String>,
        queue: Arc<dyn ConversationQueue>,
        spawner: Arc<dyn TaskSpawner>,
        time: Arc<dyn TimeService>,
        retry_interval: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            queue,
            spawner,
            time,
            retry_interval,
            task: Mutex::new(None),
        }
    }

    /// Returns `false` if the worker was already running
    pub async fn start(&self, processor: Arc<dyn QueueProcessor>) -> bool {
        let mut task = self.task.lock().await;
        if task.is_some() {
            return false;
        }

        let name = self.name.clone();
        let queue = self.queue.clone();
        let time = self.time.clone();
        let retry = self.retry_interval;

        *task = Some(BackgroundTask::spawn(
            self.spawner.as_ref(),
            &format!("routing-queue:{}", self.name),
            move |cancel| async move {
                tracing::info!(method = %name, "Routing queue worker started");
                loop {
                    match processor.process_pending(&cancel).await {
                        Ok(0) => {}
                        Ok(n) => tracing::debug!(method = %name, "Assigned {} conversations", n),
                        Err(e) => tracing::error!(method = %name, "Routing pass failed: {}", e),
                    }

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = queue.wait_for_pending() => {}
                        _ = time.sleep(retry) => {}
                    }
                }
                tracing::info!(method = %name, "Routing queue worker stopped");
            },
        ));
        true
    }

    /// Waits for the in-flight conversation to finish. Returns `false` if the
    /// worker was not running.
    pub async fn stop(&self) -> bool {
        let mut task = self.task.lock().await;
        match task.take() {
            Some(running) => {
                running.stop().await;
                true
            }
            None => false,
        }
    }

    pub async fn is_running(&self) -> bool {
        self.task.lock().await.is_some()
    }
}
