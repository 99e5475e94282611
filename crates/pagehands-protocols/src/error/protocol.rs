//! Top-level protocol error type.

use thiserror::Error;

use super::{
    CapabilityError, DeliveryError, DomError, HandlerError, ParseError, PatternError,
    RouterError, SettingsError,
};

/// Top-level protocol error type.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Router error: {0}")]
    Router(#[from] RouterError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
