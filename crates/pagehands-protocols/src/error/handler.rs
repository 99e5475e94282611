//! Action handler errors.

use thiserror::Error;

use super::{CapabilityError, DomError, RouterError, SettingsError};

/// Failure raised by an action handler.
///
/// The router converts every variant into a `success=false` response.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("{0}")]
    Failed(String),

    #[error("Origin not allowed: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
