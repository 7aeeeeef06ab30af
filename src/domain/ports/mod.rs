pub mod agent_repository;
pub mod agent_session_repository;
pub mod assignment_repository;
pub mod business_hour_repository;
pub mod connection_probe;
pub mod conversation_queue;
pub mod event_bus;
pub mod message_repository;
pub mod notification_sender;
pub mod permission_service;
pub mod room_repository;
pub mod setting_watcher;
pub mod task_spawner;
pub mod time_service;
pub mod translator;
pub mod user_repository;
