//! Business hour gating: windows are evaluated on a fixed tick into an
//! availability snapshot the router consults before offering conversations.

pub mod manager;
pub mod snapshot;

pub use manager::BusinessHourManager;
pub use snapshot::AvailabilitySnapshot;

use crate::domain::entities::BusinessHourScope;

/// Whether a scope currently accepts conversations
pub trait AvailabilityGate: Send + Sync {
    fn is_open(&self, scope: &BusinessHourScope) -> bool;
}
