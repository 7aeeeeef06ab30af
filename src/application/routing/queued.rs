use super::context::RoutingContext;
use super::queue_worker::{QueueProcessor, QueueWorker};
use super::selection::{AgentSelector, LeastBusySelector, RoundRobinSelector};
use super::{RoutingMethod, AUTO_SELECTION, LOAD_BALANCING};
use crate::domain::entities::Conversation;
use crate::domain::errors::DomainResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

struct SelectingAssigner {
    name: String,
    selector: Box<dyn AgentSelector>,
    ctx: RoutingContext,
}

impl SelectingAssigner {
    async fn assign(&self, conversation: &Conversation) -> DomainResult<Option<String>> {
        let candidates = self.ctx.eligible_agents(conversation).await?;
        let Some(agent) = self.selector.select(&candidates) else {
            tracing::debug!(
                method = %self.name,
                "No eligible agent for conversation {}",
                conversation.id
            );
            return Ok(None);
        };

        if self.ctx.claim(conversation, &agent.id, &self.name).await? {
            Ok(Some(agent.id.clone()))
        } else {
            Ok(None)
        }
    }
}

#[async_trait]
impl QueueProcessor for SelectingAssigner {
    async fn process_pending(&self, cancel: &CancellationToken) -> DomainResult<usize> {
        let mut assigned = 0;
        for conversation in self.ctx.queue.list_pending().await? {
            if cancel.is_cancelled() {
                break;
            }
            match self.assign(&conversation).await {
                Ok(Some(_)) => assigned += 1,
                Ok(None) => {}
                Err(e) => tracing::warn!(
                    method = %self.name,
                    "Failed to route conversation {}: {}",
                    conversation.id,
                    e
                ),
            }
        }
        Ok(assigned)
    }
}

/// Routing method that assigns automatically through an agent selector
pub struct QueuedRoutingMethod {
    assigner: Arc<SelectingAssigner>,
    worker: QueueWorker,
}

impl QueuedRoutingMethod {
    pub fn new(name: &str, selector: Box<dyn AgentSelector>, ctx: RoutingContext) -> Self {
        let worker = QueueWorker::new(
            name,
            ctx.queue.clone(),
            ctx.spawner.clone(),
            ctx.time.clone(),
            ctx.retry_interval,
        );
        Self {
            assigner: Arc::new(SelectingAssigner {
                name: name.to_string(),
                selector,
                ctx,
            }),
            worker,
        }
    }

    pub fn auto_selection(ctx: RoutingContext) -> Self {
        Self::new(AUTO_SELECTION, Box::new(RoundRobinSelector), ctx)
    }

    pub fn load_balancing(ctx: RoutingContext) -> Self {
        Self::new(LOAD_BALANCING, Box::new(LeastBusySelector), ctx)
    }
}

#[async_trait]
impl RoutingMethod for QueuedRoutingMethod {
    fn name(&self) -> &str {
        &self.assigner.name
    }

    async fn start_queue(&self) {
        if !self.worker.start(self.assigner.clone()).await {
            tracing::debug!(method = %self.assigner.name, "Queue already started");
        }
    }

    async fn stop_queue(&self) {
        if !self.worker.stop().await {
            tracing::debug!(method = %self.assigner.name, "Queue already stopped");
        }
    }

    async fn assign(&self, conversation: &Conversation) -> DomainResult<Option<String>> {
        self.assigner.assign(conversation).await
    }
}
