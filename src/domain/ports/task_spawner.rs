use futures::future::BoxFuture;

/// Resolves once the spawned task has exited
pub type TaskCompletion = BoxFuture<'static, ()>;

/// Configurable trait for spawning background tasks
/// Allows abstracting the runtime (Tokio) for testing or other environments
pub trait TaskSpawner: Send + Sync {
    /// Spawn a named future; the returned completion lets the owner await its exit
    fn spawn(&self, name: &str, future: BoxFuture<'static, ()>) -> TaskCompletion;
}
