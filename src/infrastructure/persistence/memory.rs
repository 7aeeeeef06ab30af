use crate::domain::entities::{
    Agent, AgentSession, AgentStatus, Assignment, BusinessHour, Conversation, Message, Room, User,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::agent_repository::AgentRepository;
use crate::domain::ports::agent_session_repository::AgentSessionRepository;
use crate::domain::ports::assignment_repository::AssignmentRepository;
use crate::domain::ports::business_hour_repository::BusinessHourRepository;
use crate::domain::ports::conversation_queue::ConversationQueue;
use crate::domain::ports::message_repository::MessageRepository;
use crate::domain::ports::permission_service::PermissionService;
use crate::domain::ports::room_repository::RoomRepository;
use crate::domain::ports::user_repository::UserRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    rooms: HashMap<String, Room>,
    members: HashMap<String, HashSet<String>>,
    messages: HashMap<String, Message>,
    grants: HashSet<(String, String, Option<String>)>,
    agents: HashMap<String, Agent>,
    sessions: HashMap<String, AgentSession>,
    pending: Vec<Conversation>,
    assignments: Vec<Assignment>,
    business_hours: Vec<BusinessHour>,
}

/// Process-local store backing every repository port. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<Mutex<Tables>>,
    enqueued: Arc<Notify>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: User) {
        self.tables.lock().users.insert(user.id.clone(), user);
    }

    pub fn insert_room(&self, room: Room) {
        self.tables.lock().rooms.insert(room.id.clone(), room);
    }

    /// Grant a capability globally (`scope_id = None`) or within one room
    pub fn grant_permission(&self, user_id: &str, permission: &str, scope_id: Option<&str>) {
        self.tables.lock().grants.insert((
            user_id.to_string(),
            permission.to_string(),
            scope_id.map(str::to_string),
        ));
    }

    pub fn insert_agent(&self, agent: Agent) {
        self.tables.lock().agents.insert(agent.id.clone(), agent);
    }

    pub fn get_agent(&self, agent_id: &str) -> Option<Agent> {
        self.tables.lock().agents.get(agent_id).cloned()
    }

    pub fn upsert_session(&self, session: AgentSession) {
        self.tables
            .lock()
            .sessions
            .insert(session.agent_id.clone(), session);
    }

    pub fn message_count(&self) -> usize {
        self.tables.lock().messages.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryDatabase {
    async fn find_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.tables.lock().users.get(id).cloned())
    }
}

#[async_trait]
impl RoomRepository for InMemoryDatabase {
    async fn find_room_by_id(&self, id: &str) -> DomainResult<Option<Room>> {
        Ok(self.tables.lock().rooms.get(id).cloned())
    }

    async fn add_member(&self, room_id: &str, user_id: &str) -> DomainResult<()> {
        let mut tables = self.tables.lock();
        if !tables.rooms.contains_key(room_id) {
            return Err(DomainError::NotFound(format!("Room {} not found", room_id)));
        }
        tables
            .members
            .entry(room_id.to_string())
            .or_default()
            .insert(user_id.to_string());
        Ok(())
    }

    async fn remove_member(&self, room_id: &str, user_id: &str) -> DomainResult<()> {
        if let Some(members) = self.tables.lock().members.get_mut(room_id) {
            members.remove(user_id);
        }
        Ok(())
    }

    async fn is_member(&self, room_id: &str, user_id: &str) -> DomainResult<bool> {
        Ok(self
            .tables
            .lock()
            .members
            .get(room_id)
            .map(|m| m.contains(user_id))
            .unwrap_or(false))
    }
}

#[async_trait]
impl MessageRepository for InMemoryDatabase {
    async fn save_message(&self, message: &Message) -> DomainResult<()> {
        self.tables
            .lock()
            .messages
            .insert(message.id.clone(), message.clone());
        Ok(())
    }

    async fn get_message_by_id(&self, id: &str) -> DomainResult<Option<Message>> {
        Ok(self.tables.lock().messages.get(id).cloned())
    }
}

#[async_trait]
impl PermissionService for InMemoryDatabase {
    /// Room-scoped checks also honor global grants
    async fn has_permission(
        &self,
        user_id: &str,
        permission: &str,
        scope_id: Option<&str>,
    ) -> DomainResult<bool> {
        let tables = self.tables.lock();
        let granted = |scope: Option<String>| {
            tables
                .grants
                .contains(&(user_id.to_string(), permission.to_string(), scope))
        };
        Ok(granted(None) || scope_id.map(|s| granted(Some(s.to_string()))).unwrap_or(false))
    }
}

#[async_trait]
impl AgentRepository for InMemoryDatabase {
    async fn find_agents(&self, department_id: Option<&str>) -> DomainResult<Vec<Agent>> {
        let mut agents: Vec<Agent> = self
            .tables
            .lock()
            .agents
            .values()
            .filter(|a| a.serves(department_id))
            .cloned()
            .collect();
        agents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(agents)
    }

    async fn record_routed(&self, agent_id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let mut tables = self.tables.lock();
        let agent = tables
            .agents
            .get_mut(agent_id)
            .ok_or_else(|| DomainError::NotFound(format!("Agent {} not found", agent_id)))?;
        agent.active_chats += 1;
        agent.last_routed_at = Some(at);
        Ok(())
    }
}

#[async_trait]
impl AgentSessionRepository for InMemoryDatabase {
    async fn get_session(&self, agent_id: &str) -> DomainResult<Option<AgentSession>> {
        Ok(self.tables.lock().sessions.get(agent_id).cloned())
    }

    async fn list_non_offline_sessions(&self) -> DomainResult<Vec<AgentSession>> {
        let mut sessions: Vec<AgentSession> = self
            .tables
            .lock()
            .sessions
            .values()
            .filter(|s| s.status != AgentStatus::Offline)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));
        Ok(sessions)
    }

    async fn update_status(
        &self,
        agent_id: &str,
        status: AgentStatus,
        at: DateTime<Utc>,
        system_modified: bool,
    ) -> DomainResult<()> {
        let mut tables = self.tables.lock();
        let session = tables.sessions.get_mut(agent_id).ok_or_else(|| {
            DomainError::NotFound(format!("Agent {} has no session", agent_id))
        })?;
        session.status = status;
        session.last_transition_at = at;
        session.system_modified = system_modified;
        Ok(())
    }

    async fn update_status_if(
        &self,
        agent_id: &str,
        expected: AgentStatus,
        status: AgentStatus,
        at: DateTime<Utc>,
        system_modified: bool,
    ) -> DomainResult<bool> {
        let mut tables = self.tables.lock();
        let session = tables.sessions.get_mut(agent_id).ok_or_else(|| {
            DomainError::NotFound(format!("Agent {} has no session", agent_id))
        })?;
        if session.status != expected {
            return Ok(false);
        }
        session.status = status;
        session.last_transition_at = at;
        session.system_modified = system_modified;
        Ok(true)
    }
}

#[async_trait]
impl ConversationQueue for InMemoryDatabase {
    async fn enqueue(&self, conversation: Conversation) -> DomainResult<()> {
        {
            let mut tables = self.tables.lock();
            if tables.pending.iter().any(|c| c.id == conversation.id) {
                return Err(DomainError::Conflict(format!(
                    "Conversation {} is already queued",
                    conversation.id
                )));
            }
            tables.pending.push(conversation);
            tables.pending.sort_by_key(|c| c.queued_at);
        }
        self.enqueued.notify_one();
        Ok(())
    }

    async fn list_pending(&self) -> DomainResult<Vec<Conversation>> {
        Ok(self.tables.lock().pending.clone())
    }

    async fn take(&self, conversation_id: &str) -> DomainResult<bool> {
        let mut tables = self.tables.lock();
        let before = tables.pending.len();
        tables.pending.retain(|c| c.id != conversation_id);
        Ok(tables.pending.len() != before)
    }

    async fn wait_for_pending(&self) {
        self.enqueued.notified().await;
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryDatabase {
    async fn record_assignment(&self, assignment: &Assignment) -> DomainResult<()> {
        self.tables.lock().assignments.push(assignment.clone());
        Ok(())
    }

    async fn list_assignments(&self) -> DomainResult<Vec<Assignment>> {
        Ok(self.tables.lock().assignments.clone())
    }
}

#[async_trait]
impl BusinessHourRepository for InMemoryDatabase {
    async fn list_business_hours(&self) -> DomainResult<Vec<BusinessHour>> {
        Ok(self.tables.lock().business_hours.clone())
    }

    async fn find_business_hour(&self, id: &str) -> DomainResult<Option<BusinessHour>> {
        Ok(self
            .tables
            .lock()
            .business_hours
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn save_business_hour(&self, business_hour: &BusinessHour) -> DomainResult<()> {
        let mut tables = self.tables.lock();
        match tables
            .business_hours
            .iter_mut()
            .find(|b| b.id == business_hour.id)
        {
            Some(existing) => *existing = business_hour.clone(),
            None => tables.business_hours.push(business_hour.clone()),
        }
        Ok(())
    }

    async fn delete_business_hour(&self, id: &str) -> DomainResult<bool> {
        let mut tables = self.tables.lock();
        let before = tables.business_hours.len();
        tables.business_hours.retain(|b| b.id != id);
        Ok(tables.business_hours.len() != before)
    }
}
