use super::context::RoutingContext;
use super::{RoutingMethod, MANUAL_SELECTION};
use crate::domain::entities::Conversation;
use crate::domain::errors::{DomainError, DomainResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

/// Conversations wait in the queue until an agent takes one explicitly
pub struct ManualSelection {
    ctx: RoutingContext,
    started: AtomicBool,
}

impl ManualSelection {
    pub fn new(ctx: RoutingContext) -> Self {
        Self {
            ctx,
            started: AtomicBool::new(false),
        }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// An agent picks a pending conversation
    pub async fn take(&self, conversation_id: &str, agent_id: &str) -> DomainResult<()> {
        if !self.is_started() {
            return Err(DomainError::Conflict(
                "Manual selection is not the active routing method".to_string(),
            ));
        }

        let conversation = self
            .ctx
            .queue
            .list_pending()
            .await?
            .into_iter()
            .find(|c| c.id == conversation_id)
            .ok_or_else(|| {
                DomainError::NotFound(format!("Conversation {} is not pending", conversation_id))
            })?;

        let eligible = self.ctx.eligible_agents(&conversation).await?;
        if !eligible.iter().any(|a| a.id == agent_id) {
            return Err(DomainError::Forbidden(format!(
                "Agent {} cannot take conversation {}",
                agent_id, conversation_id
            )));
        }

        if !self.ctx.claim(&conversation, agent_id, MANUAL_SELECTION).await? {
            return Err(DomainError::Conflict(format!(
                "Conversation {} was already taken",
                conversation_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RoutingMethod for ManualSelection {
    fn name(&self) -> &str {
        MANUAL_SELECTION
    }

    async fn start_queue(&self) {
        self.started.store(true, Ordering::SeqCst);
    }

    async fn stop_queue(&self) {
        self.started.store(false, Ordering::SeqCst);
    }

    async fn assign(&self, _conversation: &Conversation) -> DomainResult<Option<String>> {
        Ok(None)
    }
}
