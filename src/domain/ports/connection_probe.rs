use async_trait::async_trait;

/// Sampled connection state of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Active,
    /// Connected, but no activity within the idle timeout
    Idle,
    Disconnected,
}

#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    async fn liveness(&self, user_id: &str) -> Liveness;
}
