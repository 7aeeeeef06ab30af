use crate::domain::entities::Room;
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn find_room_by_id(&self, id: &str) -> DomainResult<Option<Room>>;
    async fn add_member(&self, room_id: &str, user_id: &str) -> DomainResult<()>;
    async fn remove_member(&self, room_id: &str, user_id: &str) -> DomainResult<()>;
    async fn is_member(&self, room_id: &str, user_id: &str) -> DomainResult<bool>;
}
