use crate::domain::entities::{AgentStatus, BusinessHourScope};

/// System events published by the omnichannel core
#[derive(Debug, Clone)]
pub enum SystemEvent {
    ConversationQueued {
        conversation_id: String,
        room_id: String,
        department_id: Option<String>,
        timestamp: String, // ISO 8601
    },
    ConversationAssigned {
        conversation_id: String,
        room_id: String,
        agent_id: String,
        method: String,
        timestamp: String, // ISO 8601
    },
    AgentStatusChanged {
        agent_id: String,
        old_status: AgentStatus,
        new_status: AgentStatus,
        timestamp: String, // ISO 8601
        reason: String,    // "activity_monitor", "logout", "manual"
    },
    ScopeAvailabilityChanged {
        scope: BusinessHourScope,
        open: bool,
        timestamp: String, // ISO 8601
    },
    RoutingMethodChanged {
        previous: Option<String>,
        current: String,
        timestamp: String, // ISO 8601
    },
}
