use super::{BeforeSaveMessage, HookHandler, HookPriority, HookRegistry, HookResult, HookVeto};
use crate::domain::entities::{Message, MENTION_ALL};
use crate::domain::ports::notification_sender::NotificationSender;
use crate::domain::ports::permission_service::{PermissionService, PERMISSION_MENTION_ALL};
use crate::domain::ports::time_service::TimeService;
use crate::domain::ports::translator::Translator;
use crate::domain::ports::user_repository::UserRepository;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub const MENTION_ALL_FILTER_ID: &str = "filter-mention-all";
pub const REASON_ACTION_NOT_ALLOWED: &str = "error-action-not-allowed";
pub const ACTION_NOTIFY_ALL: &str = "Notify_all_in_this_room";

/// Messages further than this from now are imports or replays; their
/// notifications are skipped, so the check is skipped too
const MAX_MESSAGE_AGE_MS: i64 = 60_000;

/// Stops users without the `mention-all` capability from notifying a whole room
pub struct MentionAllFilter {
    permissions: Arc<dyn PermissionService>,
    users: Arc<dyn UserRepository>,
    notifications: Arc<dyn NotificationSender>,
    translator: Arc<dyn Translator>,
    time: Arc<dyn TimeService>,
    fallback_language: String,
}

impl MentionAllFilter {
    pub fn new(
        permissions: Arc<dyn PermissionService>,
        users: Arc<dyn UserRepository>,
        notifications: Arc<dyn NotificationSender>,
        translator: Arc<dyn Translator>,
        time: Arc<dyn TimeService>,
        fallback_language: String,
    ) -> Self {
        Self {
            permissions,
            users,
            notifications,
            translator,
            time,
            fallback_language,
        }
    }

    fn skips_check(&self, message: &Message) -> bool {
        if message.is_edited() {
            return true;
        }
        match message.ts {
            Some(ts) => (ts - self.time.now()).num_milliseconds().abs() > MAX_MESSAGE_AGE_MS,
            None => false,
        }
    }

    async fn may_mention_all(&self, message: &Message) -> HookResult<bool> {
        let user_id = &message.author.id;
        if self
            .permissions
            .has_permission(user_id, PERMISSION_MENTION_ALL, None)
            .await?
        {
            return Ok(true);
        }
        Ok(self
            .permissions
            .has_permission(user_id, PERMISSION_MENTION_ALL, Some(&message.room_id))
            .await?)
    }

    async fn notify_not_allowed(&self, message: &Message) {
        let language = match self.users.find_user_by_id(&message.author.id).await {
            Ok(user) => user.and_then(|u| u.language),
            Err(e) => {
                tracing::warn!("Failed to look up language of {}: {}", message.author.id, e);
                None
            }
        }
        .unwrap_or_else(|| self.fallback_language.clone());

        let action = self.translator.translate(ACTION_NOTIFY_ALL, &[], &language);
        let text = self.translator.translate(
            REASON_ACTION_NOT_ALLOWED,
            &[("action", action.as_str())],
            &language,
        );

        if let Err(e) =
            self.notifications
                .broadcast_ephemeral(&message.author.id, &message.room_id, &text)
        {
            tracing::warn!(
                "Failed to send ephemeral notification to {}: {}",
                message.author.id,
                e
            );
        }
    }
}

#[async_trait]
impl HookHandler<BeforeSaveMessage> for MentionAllFilter {
    async fn handle(&self, message: Message, _context: &()) -> HookResult<Message> {
        if self.skips_check(&message) || !message.mentions_id(MENTION_ALL) {
            return Ok(message);
        }

        if self.may_mention_all(&message).await? {
            return Ok(message);
        }

        self.notify_not_allowed(&message).await;

        Err(HookVeto::new(REASON_ACTION_NOT_ALLOWED, "Notify all in this room not allowed")
            .with_details(json!({
                "method": MENTION_ALL_FILTER_ID,
                "action": ACTION_NOTIFY_ALL,
            }))
            .into())
    }
}

pub fn register_mention_all_filter(registry: &HookRegistry, filter: MentionAllFilter) {
    registry.register::<BeforeSaveMessage>(
        MENTION_ALL_FILTER_ID,
        HookPriority::Medium,
        Arc::new(filter),
    );
}
