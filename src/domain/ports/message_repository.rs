use crate::domain::entities::Message;
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn save_message(&self, message: &Message) -> DomainResult<()>;
    async fn get_message_by_id(&self, id: &str) -> DomainResult<Option<Message>>;
}
