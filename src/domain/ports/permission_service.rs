use crate::domain::errors::DomainResult;
use async_trait::async_trait;

pub const PERMISSION_VIEW_LIVECHAT_ROOM: &str = "view-l-room";
pub const PERMISSION_MENTION_ALL: &str = "mention-all";
pub const PERMISSION_ADD_USER_TO_JOINED_ROOM: &str = "add-user-to-joined-room";

#[async_trait]
pub trait PermissionService: Send + Sync {
    /// Check a capability globally (`scope_id = None`) or within a room scope
    async fn has_permission(
        &self,
        user_id: &str,
        permission: &str,
        scope_id: Option<&str>,
    ) -> DomainResult<bool>;
}
