use crate::domain::entities::Assignment;
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn record_assignment(&self, assignment: &Assignment) -> DomainResult<()>;
    async fn list_assignments(&self) -> DomainResult<Vec<Assignment>>;
}
