use crate::domain::entities::BusinessHour;
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait BusinessHourRepository: Send + Sync {
    async fn list_business_hours(&self) -> DomainResult<Vec<BusinessHour>>;
    async fn find_business_hour(&self, id: &str) -> DomainResult<Option<BusinessHour>>;
    /// Insert or replace by id
    async fn save_business_hour(&self, business_hour: &BusinessHour) -> DomainResult<()>;
    async fn delete_business_hour(&self, id: &str) -> DomainResult<bool>;
}
