//! Router and delivery errors.

use thiserror::Error;

/// The transport could not deliver a frame, or no response ever arrived.
///
/// Visible only to the original caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Destination unreachable: {0}")]
    Unreachable(String),

    #[error("No response to '{action}' within {timeout_ms}ms")]
    TimedOut { action: String, timeout_ms: u64 },

    #[error("Message of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("Context closed before a response arrived")]
    ContextClosed,

    #[error("Frame could not be encoded: {0}")]
    Encoding(String),
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("Handler failed: {0}")]
    HandlerFailure(String),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("'{action}' failed remotely: {message}")]
    Remote { action: String, message: String },

    #[error("Handler already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RouterError {
    /// Whether the caller never reached a live handler.
    pub fn is_delivery(&self) -> bool {
        matches!(self, RouterError::Delivery(_))
    }
}
