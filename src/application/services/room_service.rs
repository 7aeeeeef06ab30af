use crate::application::hooks::{BeforeJoinRoom, BeforeLeaveRoom, HookRegistry};
use crate::domain::entities::{Room, User};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::permission_service::{
    PermissionService, PERMISSION_ADD_USER_TO_JOINED_ROOM,
};
use crate::domain::ports::room_repository::RoomRepository;
use crate::domain::ports::user_repository::UserRepository;
use std::sync::Arc;

/// Room membership changes, gated by the join and leave hook chains
#[derive(Clone)]
pub struct RoomService {
    room_repo: Arc<dyn RoomRepository>,
    user_repo: Arc<dyn UserRepository>,
    permissions: Arc<dyn PermissionService>,
    hooks: Arc<HookRegistry>,
}

impl RoomService {
    pub fn new(
        room_repo: Arc<dyn RoomRepository>,
        user_repo: Arc<dyn UserRepository>,
        permissions: Arc<dyn PermissionService>,
        hooks: Arc<HookRegistry>,
    ) -> Self {
        Self {
            room_repo,
            user_repo,
            permissions,
            hooks,
        }
    }

    async fn resolve(&self, user_id: &str, room_id: &str) -> DomainResult<(User, Room)> {
        let user = self
            .user_repo
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("User {} not found", user_id)))?;
        let room = self
            .room_repo
            .find_room_by_id(room_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Room {} not found", room_id)))?;
        Ok((user, room))
    }

    pub async fn join_room(&self, user_id: &str, room_id: &str) -> DomainResult<()> {
        let (user, room) = self.resolve(user_id, room_id).await?;
        let user = self.hooks.run::<BeforeJoinRoom>(user, &room).await?;

        self.room_repo.add_member(&room.id, &user.id).await?;
        tracing::info!("User {} joined room {}", user.id, room.id);
        Ok(())
    }

    pub async fn leave_room(&self, user_id: &str, room_id: &str) -> DomainResult<()> {
        let (user, room) = self.resolve(user_id, room_id).await?;
        if !self.room_repo.is_member(&room.id, &user.id).await? {
            return Err(DomainError::Conflict(format!(
                "User {} is not in room {}",
                user.id, room.id
            )));
        }

        let user = self.hooks.run::<BeforeLeaveRoom>(user, &room).await?;

        self.room_repo.remove_member(&room.id, &user.id).await?;
        tracing::info!("User {} left room {}", user.id, room.id);
        Ok(())
    }

    /// Add another user on behalf of `actor_id`; the added user still passes
    /// through the join chain
    pub async fn add_member(&self, actor_id: &str, user_id: &str, room_id: &str) -> DomainResult<()> {
        let allowed = self
            .permissions
            .has_permission(actor_id, PERMISSION_ADD_USER_TO_JOINED_ROOM, Some(room_id))
            .await?;
        if !allowed {
            return Err(DomainError::Forbidden("no-permission".to_string()));
        }

        self.join_room(user_id, room_id).await
    }
}
