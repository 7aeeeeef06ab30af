use crate::application::business_hours::AvailabilityGate;
use crate::domain::entities::{Agent, AgentStatus, Assignment, BusinessHourScope, Conversation};
use crate::domain::errors::DomainResult;
use crate::domain::events::SystemEvent;
use crate::domain::ports::agent_repository::AgentRepository;
use crate::domain::ports::agent_session_repository::AgentSessionRepository;
use crate::domain::ports::assignment_repository::AssignmentRepository;
use crate::domain::ports::conversation_queue::ConversationQueue;
use crate::domain::ports::event_bus::EventBus;
use crate::domain::ports::task_spawner::TaskSpawner;
use crate::domain::ports::time_service::TimeService;
use std::sync::Arc;
use std::time::Duration;

/// Collaborators every routing method shares
#[derive(Clone)]
pub struct RoutingContext {
    pub agents: Arc<dyn AgentRepository>,
    pub sessions: Arc<dyn AgentSessionRepository>,
    pub availability: Arc<dyn AvailabilityGate>,
    pub queue: Arc<dyn ConversationQueue>,
    pub assignments: Arc<dyn AssignmentRepository>,
    pub event_bus: Arc<dyn EventBus>,
    pub time: Arc<dyn TimeService>,
    pub spawner: Arc<dyn TaskSpawner>,
    /// How long an idle worker waits before re-reading the queue
    pub retry_interval: Duration,
}

impl RoutingContext {
    /// Agents that may take `conversation` right now: serving its department,
    /// inside business hours and available
    pub async fn eligible_agents(&self, conversation: &Conversation) -> DomainResult<Vec<Agent>> {
        let department = conversation.department_id.as_deref();
        if !self
            .availability
            .is_open(&BusinessHourScope::for_department(department))
        {
            tracing::debug!(
                "Scope of conversation {} is outside business hours",
                conversation.id
            );
            return Ok(Vec::new());
        }

        let mut eligible = Vec::new();
        for agent in self.agents.find_agents(department).await? {
            if self.is_available(&agent.id).await? {
                eligible.push(agent);
            }
        }
        Ok(eligible)
    }

    pub async fn is_available(&self, agent_id: &str) -> DomainResult<bool> {
        Ok(self
            .sessions
            .get_session(agent_id)
            .await?
            .map(|s| s.status == AgentStatus::Available)
            .unwrap_or(false))
    }

    /// Claim the conversation from the queue and record it against `agent_id`.
    /// Returns `false` when another path already took it.
    pub async fn claim(
        &self,
        conversation: &Conversation,
        agent_id: &str,
        method: &str,
    ) -> DomainResult<bool> {
        if !self.queue.take(&conversation.id).await? {
            tracing::debug!("Conversation {} was already taken", conversation.id);
            return Ok(false);
        }

        let now = self.time.now();
        let assignment = Assignment::new(
            conversation,
            agent_id.to_string(),
            method.to_string(),
            now,
        );
        self.assignments.record_assignment(&assignment).await?;
        self.agents.record_routed(agent_id, now).await?;

        metrics::counter!("omnidesk_assignments_total", "method" => method.to_string())
            .increment(1);
        tracing::info!(
            "Assigned conversation {} to agent {} via {}",
            conversation.id,
            agent_id,
            method
        );

        let event = SystemEvent::ConversationAssigned {
            conversation_id: conversation.id.clone(),
            room_id: conversation.room_id.clone(),
            agent_id: agent_id.to_string(),
            method: method.to_string(),
            timestamp: now.to_rfc3339(),
        };
        if let Err(e) = self.event_bus.publish(event) {
            tracing::warn!("Failed to publish assignment event: {}", e);
        }

        Ok(true)
    }
}
