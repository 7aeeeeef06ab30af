use crate::domain::entities::Agent;

/// Picks one agent out of the eligible candidates
pub trait AgentSelector: Send + Sync {
    fn select<'a>(&self, candidates: &'a [Agent]) -> Option<&'a Agent>;
}

/// Rotates through agents: never-routed agents first, then the one routed
/// longest ago
pub struct RoundRobinSelector;

impl AgentSelector for RoundRobinSelector {
    fn select<'a>(&self, candidates: &'a [Agent]) -> Option<&'a Agent> {
        candidates
            .iter()
            .min_by(|a, b| (a.last_routed_at, &a.id).cmp(&(b.last_routed_at, &b.id)))
    }
}

/// Agent with the fewest open chats; ties go to the least recently routed
pub struct LeastBusySelector;

impl AgentSelector for LeastBusySelector {
    fn select<'a>(&self, candidates: &'a [Agent]) -> Option<&'a Agent> {
        candidates.iter().min_by(|a, b| {
            (a.active_chats, a.last_routed_at, &a.id).cmp(&(b.active_chats, b.last_routed_at, &b.id))
        })
    }
}
