use super::{HookError, HookHandler, HookPoint, HookPriority, HookVeto, REASON_HOOK_REENTRANT};
use futures::FutureExt;
use parking_lot::RwLock;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

tokio::task_local! {
    /// Hook points currently executing on this task
    static RUNNING_HOOK_POINTS: Vec<&'static str>;
}

struct RegisteredHook<H: HookPoint> {
    id: String,
    priority: HookPriority,
    sequence: u64,
    handler: Arc<dyn HookHandler<H>>,
}

impl<H: HookPoint> Clone for RegisteredHook<H> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            priority: self.priority,
            sequence: self.sequence,
            handler: self.handler.clone(),
        }
    }
}

/// Ordered handler list of a single hook point
pub struct HookChain<H: HookPoint> {
    hooks: RwLock<Vec<RegisteredHook<H>>>,
    next_sequence: AtomicU64,
}

impl<H: HookPoint> Default for HookChain<H> {
    fn default() -> Self {
        Self {
            hooks: RwLock::new(Vec::new()),
            next_sequence: AtomicU64::new(0),
        }
    }
}

impl<H: HookPoint> HookChain<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler, replacing any previous handler registered under `id`.
    /// A replacement is ordered as a fresh registration.
    pub fn register(&self, id: &str, priority: HookPriority, handler: Arc<dyn HookHandler<H>>) {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let mut hooks = self.hooks.write();

        let before = hooks.len();
        hooks.retain(|h| h.id != id);
        if hooks.len() != before {
            tracing::debug!(hook_point = H::NAME, handler = id, "Replacing hook handler");
        }

        hooks.push(RegisteredHook {
            id: id.to_string(),
            priority,
            sequence,
            handler,
        });

        tracing::debug!(
            hook_point = H::NAME,
            handler = id,
            priority = %priority,
            "Hook registered"
        );
    }

    /// Remove a handler; returns whether one was registered under `id`
    pub fn unregister(&self, id: &str) -> bool {
        let mut hooks = self.hooks.write();
        let before = hooks.len();
        hooks.retain(|h| h.id != id);
        hooks.len() != before
    }

    /// Handler ids in execution order
    pub fn handler_ids(&self) -> Vec<String> {
        self.ordered().into_iter().map(|h| h.id).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.read().is_empty()
    }

    fn ordered(&self) -> Vec<RegisteredHook<H>> {
        let mut hooks = self.hooks.read().clone();
        hooks.sort_by_key(|h| (h.priority, h.sequence));
        hooks
    }

    /// Run every handler in order, threading the payload through them.
    ///
    /// Stops at the first veto. Handler errors and panics are reported as an
    /// internal-failure veto, so the caller never applies an action the chain
    /// could not fully vet.
    pub async fn run(&self, payload: H::Payload, context: &H::Context) -> Result<H::Payload, HookVeto> {
        let mut running = RUNNING_HOOK_POINTS
            .try_with(|points| points.clone())
            .unwrap_or_default();

        if running.contains(&H::NAME) {
            tracing::error!(
                hook_point = H::NAME,
                "Hook handler re-entered its own chain; check hook configuration"
            );
            return Err(HookVeto::new(
                REASON_HOOK_REENTRANT,
                format!("Hook chain {} re-entered from one of its handlers", H::NAME),
            ));
        }
        running.push(H::NAME);

        let hooks = self.ordered();
        RUNNING_HOOK_POINTS
            .scope(running, Self::execute(hooks, payload, context))
            .await
    }

    async fn execute(
        hooks: Vec<RegisteredHook<H>>,
        payload: H::Payload,
        context: &H::Context,
    ) -> Result<H::Payload, HookVeto> {
        let mut current = payload;

        for hook in hooks {
            let outcome = AssertUnwindSafe(hook.handler.handle(current, context))
                .catch_unwind()
                .await;

            current = match outcome {
                Ok(Ok(next)) => next,
                Ok(Err(HookError::Veto(veto))) => {
                    tracing::info!(
                        hook_point = H::NAME,
                        handler = %hook.id,
                        reason = %veto.reason,
                        "Hook chain vetoed"
                    );
                    record_veto(H::NAME, &veto);
                    return Err(veto);
                }
                Ok(Err(HookError::Failed(err))) => {
                    tracing::error!(
                        hook_point = H::NAME,
                        handler = %hook.id,
                        "Hook handler failed: {}",
                        err
                    );
                    let veto = HookVeto::internal(format!("Hook {} failed", hook.id));
                    record_veto(H::NAME, &veto);
                    return Err(veto);
                }
                Err(_) => {
                    tracing::error!(
                        hook_point = H::NAME,
                        handler = %hook.id,
                        "Hook handler panicked"
                    );
                    let veto = HookVeto::internal(format!("Hook {} panicked", hook.id));
                    record_veto(H::NAME, &veto);
                    return Err(veto);
                }
            };
        }

        Ok(current)
    }
}

fn record_veto(hook_point: &'static str, veto: &HookVeto) {
    metrics::counter!(
        "omnidesk_hook_vetoes_total",
        "event" => hook_point,
        "reason" => veto.reason.clone()
    )
    .increment(1);
}
