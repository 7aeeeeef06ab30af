use crate::domain::entities::Conversation;
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

/// Pending conversations waiting for an agent
#[async_trait]
pub trait ConversationQueue: Send + Sync {
    async fn enqueue(&self, conversation: Conversation) -> DomainResult<()>;
    /// Snapshot of pending conversations, oldest first; does not remove anything
    async fn list_pending(&self) -> DomainResult<Vec<Conversation>>;
    /// Remove a conversation; `false` when it was already taken
    async fn take(&self, conversation_id: &str) -> DomainResult<bool>;
    /// Resolves when something was enqueued since the last wait
    async fn wait_for_pending(&self);
}
