use crate::application::hooks::HookVeto;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Vetoed: {0}")]
    Vetoed(#[from] HookVeto),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// The veto behind this error, if the action was stopped by a hook
    pub fn veto(&self) -> Option<&HookVeto> {
        match self {
            DomainError::Vetoed(veto) => Some(veto),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
