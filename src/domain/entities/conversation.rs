use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An omnichannel conversation waiting in the routing queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub room_id: String,
    pub department_id: Option<String>,
    pub queued_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(room_id: String, department_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            room_id,
            department_id,
            queued_at: Utc::now(),
        }
    }
}

/// Record of a conversation handed to an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub conversation_id: String,
    pub room_id: String,
    pub agent_id: String,
    pub method: String,
    pub assigned_at: DateTime<Utc>,
}

impl Assignment {
    pub fn new(
        conversation: &Conversation,
        agent_id: String,
        method: String,
        assigned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            conversation_id: conversation.id.clone(),
            room_id: conversation.room_id.clone(),
            agent_id,
            method,
            assigned_at,
        }
    }
}
