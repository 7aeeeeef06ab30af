use crate::domain::entities::Agent;
use crate::domain::errors::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait AgentRepository: Send + Sync {
    /// Agents serving a department (`None` lists every agent)
    async fn find_agents(&self, department_id: Option<&str>) -> DomainResult<Vec<Agent>>;
    /// Bump the agent's chat count and routing timestamp after an assignment
    async fn record_routed(&self, agent_id: &str, at: DateTime<Utc>) -> DomainResult<()>;
}
