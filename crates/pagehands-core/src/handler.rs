//! Action handler abstraction.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use pagehands_protocols::{ContextAddress, HandlerError};

use crate::router::Router;

/// An incoming request or notification, already decoded from its envelope.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    pub action: String,
    pub payload: Value,
    pub origin: ContextAddress,
}

/// Handles one action (or every action under a prefix).
///
/// The router passes a handle to itself so handlers can issue further calls
/// without holding a reference back to the router that owns them.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(&self, request: HandlerRequest, router: Router) -> Result<Value, HandlerError>;
}

/// [`ActionHandler`] backed by an async closure.
pub struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> ActionHandler for FnHandler<F>
where
    F: Fn(HandlerRequest, Router) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
{
    async fn handle(&self, request: HandlerRequest, router: Router) -> Result<Value, HandlerError> {
        (self.f)(request, router).await
    }
}

/// Wrap an async closure as a shareable handler.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn ActionHandler>
where
    F: Fn(HandlerRequest, Router) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
{
    Arc::new(FnHandler { f })
}
