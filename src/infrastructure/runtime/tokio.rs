use crate::domain::ports::task_spawner::{TaskCompletion, TaskSpawner};
use crate::domain::ports::time_service::TimeService;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::time::Duration;

#[derive(Clone, Default)]
pub struct TokioTaskSpawner;

impl TokioTaskSpawner {
    pub fn new() -> Self {
        Self
    }
}

impl TaskSpawner for TokioTaskSpawner {
    fn spawn(&self, name: &str, future: BoxFuture<'static, ()>) -> TaskCompletion {
        let handle = tokio::spawn(future);
        let name = name.to_string();
        async move {
            if let Err(e) = handle.await {
                tracing::error!(task = %name, "Background task ended abnormally: {}", e);
            }
        }
        .boxed()
    }
}

#[derive(Clone, Default)]
pub struct TokioTimeService;

impl TokioTimeService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TimeService for TokioTimeService {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
