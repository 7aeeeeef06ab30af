use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Available,
    Away,
    Offline,
}

impl Default for AgentStatus {
    fn default() -> Self {
        AgentStatus::Offline
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentStatus::Available => write!(f, "available"),
            AgentStatus::Away => write!(f, "away"),
            AgentStatus::Offline => write!(f, "offline"),
        }
    }
}

impl std::str::FromStr for AgentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(AgentStatus::Available),
            "away" => Ok(AgentStatus::Away),
            "offline" | "not-available" => Ok(AgentStatus::Offline),
            _ => Err(format!("Invalid agent status: {}", s)),
        }
    }
}

/// Agent as seen by the routing pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub departments: Vec<String>,
    pub active_chats: u32,
    pub last_routed_at: Option<DateTime<Utc>>,
}

impl Agent {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            departments: Vec::new(),
            active_chats: 0,
            last_routed_at: None,
        }
    }

    pub fn with_department(mut self, department_id: impl Into<String>) -> Self {
        self.departments.push(department_id.into());
        self
    }

    /// Agents without departments serve conversations that have none
    pub fn serves(&self, department_id: Option<&str>) -> bool {
        match department_id {
            Some(dep) => self.departments.iter().any(|d| d == dep),
            None => true,
        }
    }
}

/// Recorded live status of an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSession {
    pub agent_id: String,
    pub status: AgentStatus,
    pub last_transition_at: DateTime<Utc>,
    /// Set when the status was changed by the system rather than the agent
    pub system_modified: bool,
}

impl AgentSession {
    pub fn new(agent_id: impl Into<String>, status: AgentStatus) -> Self {
        Self {
            agent_id: agent_id.into(),
            status,
            last_transition_at: Utc::now(),
            system_modified: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_accepts_legacy_not_available() {
        assert_eq!("not-available".parse::<AgentStatus>(), Ok(AgentStatus::Offline));
        assert_eq!("Available".parse::<AgentStatus>(), Ok(AgentStatus::Available));
        assert!("busy".parse::<AgentStatus>().is_err());
    }

    #[test]
    fn test_department_scoping() {
        let agent = Agent::new("a1", "alice").with_department("sales");
        assert!(agent.serves(Some("sales")));
        assert!(!agent.serves(Some("support")));
        assert!(agent.serves(None));
    }
}
