//! Prioritized interceptors for domain events.
//!
//! Feature modules register handlers against a hook point (`before-save-message`,
//! `before-join-room`, `before-leave-room`). The origin of the event runs the chain
//! and only applies its side effect when every handler let the payload through.

pub mod chain;
pub mod mention_all;
pub mod registry;
pub mod room_access;

pub use chain::HookChain;
pub use registry::{BeforeJoinRoom, BeforeLeaveRoom, BeforeSaveMessage, HookRegistry};

use crate::domain::errors::DomainError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Reason code reported when a handler fails or panics instead of vetoing
pub const REASON_INTERNAL_HOOK_FAILURE: &str = "error-internal-hook-failure";
/// Reason code reported when a handler re-enters the chain it is running in
pub const REASON_HOOK_REENTRANT: &str = "error-hook-reentrant";

/// Execution tier; handlers with a lower tier run first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookPriority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for HookPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookPriority::High => write!(f, "high"),
            HookPriority::Medium => write!(f, "medium"),
            HookPriority::Low => write!(f, "low"),
        }
    }
}

/// Terminal, intentional failure that stops the originating action
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{reason}: {message}")]
pub struct HookVeto {
    pub reason: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HookVeto {
    pub fn new(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(REASON_INTERNAL_HOOK_FAILURE, message)
    }
}

/// What a handler can return besides a payload
#[derive(Debug, Error)]
pub enum HookError {
    #[error(transparent)]
    Veto(#[from] HookVeto),
    #[error("{0}")]
    Failed(String),
}

impl From<DomainError> for HookError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Vetoed(veto) => HookError::Veto(veto),
            other => HookError::Failed(other.to_string()),
        }
    }
}

pub type HookResult<T> = Result<T, HookError>;

/// A named event of the fixed vocabulary, with the payload threaded through its
/// handlers and the context every handler sees unchanged
pub trait HookPoint: Send + Sync + Sized + 'static {
    const NAME: &'static str;
    type Payload: Send + 'static;
    type Context: Send + Sync + 'static;

    fn chain(registry: &HookRegistry) -> &HookChain<Self>;
}

#[async_trait]
pub trait HookHandler<H: HookPoint>: Send + Sync {
    async fn handle(&self, payload: H::Payload, context: &H::Context) -> HookResult<H::Payload>;
}

/// Adapter for synchronous closures
pub struct FnHook<F>(pub F);

/// Wrap a synchronous closure as a handler of hook point `H`
pub fn from_fn<H, F>(f: F) -> Arc<dyn HookHandler<H>>
where
    H: HookPoint,
    F: Fn(H::Payload, &H::Context) -> HookResult<H::Payload> + Send + Sync + 'static,
{
    Arc::new(FnHook(f))
}

#[async_trait]
impl<H, F> HookHandler<H> for FnHook<F>
where
    H: HookPoint,
    F: Fn(H::Payload, &H::Context) -> HookResult<H::Payload> + Send + Sync,
{
    async fn handle(&self, payload: H::Payload, context: &H::Context) -> HookResult<H::Payload> {
        (self.0)(payload, context)
    }
}
