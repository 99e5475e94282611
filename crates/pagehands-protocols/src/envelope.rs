//! Envelope types exchanged between contexts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::address::ContextAddress;

/// Request or notification envelope.
///
/// `correlation_id` is present only when the sender expects a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub action: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub origin_context: ContextAddress,
}

impl Envelope {
    /// Create a request that expects exactly one response.
    pub fn request(
        action: impl Into<String>,
        payload: Value,
        correlation_id: impl Into<String>,
        origin: ContextAddress,
    ) -> Self {
        Self {
            action: action.into(),
            payload,
            correlation_id: Some(correlation_id.into()),
            origin_context: origin,
        }
    }

    /// Create a fire-and-forget notification.
    pub fn notification(action: impl Into<String>, payload: Value, origin: ContextAddress) -> Self {
        Self {
            action: action.into(),
            payload,
            correlation_id: None,
            origin_context: origin,
        }
    }

    pub fn expects_response(&self) -> bool {
        self.correlation_id.is_some()
    }
}

/// Response envelope, paired with a request by `correlation_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub correlation_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    pub fn ok(correlation_id: impl Into<String>, data: Value) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(correlation_id: impl Into<String>, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.is_empty() {
            error = "unspecified failure".to_string();
        }
        Self {
            correlation_id: correlation_id.into(),
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// A single frame on the messaging fabric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    Request(Envelope),
    Response(ResponseEnvelope),
}

impl Message {
    /// Correlation id carried by this frame, if any.
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            Message::Request(env) => env.correlation_id.as_deref(),
            Message::Response(resp) => Some(&resp.correlation_id),
        }
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
