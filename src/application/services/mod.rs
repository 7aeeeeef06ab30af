pub mod activity_monitor;
pub mod agent_status_service;
pub mod message_service;
pub mod room_service;

pub use activity_monitor::AgentActivityMonitor;
pub use agent_status_service::AgentStatusService;
pub use message_service::MessageService;
pub use room_service::RoomService;
