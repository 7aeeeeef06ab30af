use crate::domain::entities::User;
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_id(&self, id: &str) -> DomainResult<Option<User>>;
}
