use crate::domain::entities::{AgentStatus, User};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::events::SystemEvent;
use crate::domain::ports::agent_session_repository::AgentSessionRepository;
use crate::domain::ports::event_bus::EventBus;
use crate::domain::ports::time_service::TimeService;
use std::sync::Arc;

pub const REASON_MANUAL: &str = "manual";
pub const REASON_LOGOUT: &str = "logout";
pub const REASON_ACTIVITY_MONITOR: &str = "activity_monitor";

/// Explicit agent status changes
#[derive(Clone)]
pub struct AgentStatusService {
    sessions: Arc<dyn AgentSessionRepository>,
    event_bus: Arc<dyn EventBus>,
    time: Arc<dyn TimeService>,
}

impl AgentStatusService {
    pub fn new(
        sessions: Arc<dyn AgentSessionRepository>,
        event_bus: Arc<dyn EventBus>,
        time: Arc<dyn TimeService>,
    ) -> Self {
        Self {
            sessions,
            event_bus,
            time,
        }
    }

    /// Returns whether the status actually changed
    pub async fn set_status(
        &self,
        agent_id: &str,
        status: AgentStatus,
        reason: &str,
        system_modified: bool,
    ) -> DomainResult<bool> {
        let session = self
            .sessions
            .get_session(agent_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Agent {} has no session", agent_id)))?;

        if session.status == status {
            return Ok(false);
        }

        let now = self.time.now();
        self.sessions
            .update_status(agent_id, status, now, system_modified)
            .await?;

        let event = SystemEvent::AgentStatusChanged {
            agent_id: agent_id.to_string(),
            old_status: session.status,
            new_status: status,
            timestamp: now.to_rfc3339(),
            reason: reason.to_string(),
        };
        if let Err(e) = self.event_bus.publish(event) {
            tracing::warn!("Failed to publish agent status change: {}", e);
        }

        tracing::info!(
            "Agent {} status changed from {} to {} ({})",
            agent_id,
            session.status,
            status,
            reason
        );
        Ok(true)
    }

    /// Take a logged-out agent offline; bots and non-agents are ignored
    pub async fn handle_logout(&self, user: &User) -> DomainResult<()> {
        if !user.is_livechat_agent() {
            return Ok(());
        }

        self.set_status(&user.id, AgentStatus::Offline, REASON_LOGOUT, true)
            .await?;
        Ok(())
    }
}
