use crate::domain::entities::{AgentSession, AgentStatus};
use crate::domain::errors::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait AgentSessionRepository: Send + Sync {
    async fn get_session(&self, agent_id: &str) -> DomainResult<Option<AgentSession>>;
    /// Sessions whose status is available or away
    async fn list_non_offline_sessions(&self) -> DomainResult<Vec<AgentSession>>;
    async fn update_status(
        &self,
        agent_id: &str,
        status: AgentStatus,
        at: DateTime<Utc>,
        system_modified: bool,
    ) -> DomainResult<()>;
    /// Write `status` only while the stored status is still `expected`.
    /// Returns whether the write happened.
    async fn update_status_if(
        &self,
        agent_id: &str,
        expected: AgentStatus,
        status: AgentStatus,
        at: DateTime<Utc>,
        system_modified: bool,
    ) -> DomainResult<bool>;
}
