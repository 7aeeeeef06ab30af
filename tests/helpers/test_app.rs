use crate::helpers::clock::{monday_at, ManualClock};
use omnidesk::application::hooks::HookVeto;
use omnidesk::bootstrap::{build_app_state_with_clock, AppState};
use omnidesk::config::Config;
use omnidesk::domain::entities::{
    Agent, AgentSession, AgentStatus, Message, MessageAuthor, Room, RoomType, User,
    ROLE_LIVECHAT_AGENT,
};
use omnidesk::domain::errors::DomainError;
use omnidesk::domain::events::SystemEvent;
use omnidesk::domain::ports::event_bus::EventBus;
use omnidesk::domain::ports::time_service::TimeService;
use omnidesk::infrastructure::providers::{ClientEvent, ConnectionManager};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub type EventStream =
    Pin<Box<dyn futures::Stream<Item = Result<SystemEvent, String>> + Send>>;

pub struct TestApp {
    pub state: AppState,
    pub clock: ManualClock,
    pub config: Config,
}

pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("BUSINESS_HOUR_TICK_SECONDS", "60"),
        ("ACTIVITY_MONITOR_INTERVAL_SECONDS", "60"),
        ("AGENT_IDLE_TIMEOUT_SECONDS", "300"),
        ("ROUTING_RETRY_SECONDS", "1"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).expect("valid test config")
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config(&[])).await
    }

    pub async fn with_config(config: Config) -> Self {
        let clock = ManualClock::at(monday_at(10, 0));
        let state = build_app_state_with_clock(&config, Arc::new(clock.clone()))
            .await
            .expect("Failed to build app state");
        Self {
            state,
            clock,
            config,
        }
    }

    pub fn events(&self) -> EventStream {
        self.state.event_bus.subscribe()
    }

    pub fn add_user(&self, user: User) -> User {
        self.state.db.insert_user(user.clone());
        user
    }

    pub fn add_room(&self, id: &str, kind: RoomType) -> Room {
        let room = Room::new(id, id, kind);
        self.state.db.insert_room(room.clone());
        room
    }

    /// Livechat agent with a routing profile and a session in `status`
    pub fn add_agent(&self, id: &str, department: Option<&str>, status: AgentStatus) -> Agent {
        self.add_user(User::new(id, id).with_role(ROLE_LIVECHAT_AGENT));
        let mut agent = Agent::new(id, id);
        if let Some(dep) = department {
            agent = agent.with_department(dep);
        }
        self.state.db.insert_agent(agent.clone());
        self.state.db.upsert_session(AgentSession::new(id, status));
        agent
    }

    pub async fn session_status(&self, agent_id: &str) -> AgentStatus {
        use omnidesk::domain::ports::agent_session_repository::AgentSessionRepository;
        self.state
            .db
            .get_session(agent_id)
            .await
            .unwrap()
            .map(|s| s.status)
            .unwrap_or_default()
    }

    /// Fresh message stamped with the test clock
    pub fn message(&self, author: &User, room_id: &str, text: &str) -> Message {
        let mut message = Message::new(
            room_id.to_string(),
            MessageAuthor {
                id: author.id.clone(),
                username: author.username.clone(),
            },
            text.to_string(),
        );
        message.ts = Some(self.clock.now());
        message
    }

    /// Open a client connection for `user_id`
    pub async fn connect(&self, user_id: &str) -> mpsc::Receiver<ClientEvent> {
        let (tx, rx) = mpsc::channel(16);
        self.state.connections.add_connection(user_id, tx).await;
        rx
    }
}

/// Unwrap the veto behind a domain error
pub fn veto_of(err: DomainError) -> HookVeto {
    match err {
        DomainError::Vetoed(veto) => veto,
        other => panic!("expected a veto, got {:?}", other),
    }
}

/// Poll `condition` until it holds or five seconds pass
pub async fn wait_until<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
