//! Conversation routing: pluggable methods that drain the pending queue, and a
//! manager that hot-swaps the active one.

pub mod context;
pub mod manager;
pub mod manual;
pub mod queue_worker;
pub mod queued;
pub mod selection;

pub use context::RoutingContext;
pub use manager::RoutingManager;
pub use manual::ManualSelection;
pub use queued::QueuedRoutingMethod;
pub use selection::{AgentSelector, LeastBusySelector, RoundRobinSelector};

use crate::domain::entities::Conversation;
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

pub const AUTO_SELECTION: &str = "Auto_Selection";
pub const LOAD_BALANCING: &str = "Load_Balancing";
pub const MANUAL_SELECTION: &str = "Manual_Selection";

/// A queue-draining strategy the manager can activate
#[async_trait]
pub trait RoutingMethod: Send + Sync {
    fn name(&self) -> &str;

    /// Begin draining the pending queue; a no-op when already started
    async fn start_queue(&self);

    /// Stop draining; once this returns no new assignment is started.
    /// A no-op when already stopped.
    async fn stop_queue(&self);

    /// Try to hand one conversation to an agent, returning the agent id.
    /// `None` leaves the conversation pending.
    async fn assign(&self, conversation: &Conversation) -> DomainResult<Option<String>>;
}
