use crate::application::hooks::{BeforeSaveMessage, HookRegistry};
use crate::domain::entities::Message;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::message_repository::MessageRepository;
use crate::domain::ports::time_service::TimeService;
use std::sync::Arc;

#[derive(Clone)]
pub struct MessageService {
    message_repo: Arc<dyn MessageRepository>,
    hooks: Arc<HookRegistry>,
    time: Arc<dyn TimeService>,
}

impl MessageService {
    pub fn new(
        message_repo: Arc<dyn MessageRepository>,
        hooks: Arc<HookRegistry>,
        time: Arc<dyn TimeService>,
    ) -> Self {
        Self {
            message_repo,
            hooks,
            time,
        }
    }

    /// Run the before-save chain and persist what it returns.
    /// A veto aborts the send and nothing is stored.
    pub async fn send_message(&self, mut message: Message) -> DomainResult<Message> {
        if message.text.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Message text cannot be empty".to_string(),
            ));
        }
        if message.ts.is_none() {
            message.ts = Some(self.time.now());
        }

        let message = self.hooks.run::<BeforeSaveMessage>(message, &()).await?;
        self.message_repo.save_message(&message).await?;

        tracing::info!(
            "Message saved: id={}, room_id={}, author={}",
            message.id,
            message.room_id,
            message.author.id
        );
        Ok(message)
    }

    pub async fn get_message(&self, id: &str) -> DomainResult<Message> {
        self.message_repo
            .get_message_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Message {} not found", id)))
    }
}
