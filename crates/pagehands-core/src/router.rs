//! Request/response router.
//!
//! Every context owns one [`Router`]. Outgoing requests get a fresh
//! correlation id and a waiter; incoming responses resolve at most one waiter;
//! incoming requests are dispatched to the context's handler table and answered
//! with exactly one response.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use pagehands_config::RouterConfig;
use pagehands_protocols::{
    ContextAddress, DeliveryError, Envelope, Message, ResponseEnvelope, RouterError, Transport,
};

use crate::handler::HandlerRequest;
use crate::pending::{PendingReply, PendingTable};
use crate::registry::HandlerTable;

struct RouterInner {
    address: ContextAddress,
    transport: Arc<dyn Transport>,
    handlers: HandlerTable,
    pending: PendingTable,
    /// Requests being handled, keyed by origin and correlation id.
    in_flight: DashSet<(ContextAddress, String)>,
    request_timeout: Duration,
    closed: AtomicBool,
}

/// Cheaply cloneable handle to a context's router.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    pub fn new(
        address: ContextAddress,
        transport: Arc<dyn Transport>,
        handlers: HandlerTable,
        config: &RouterConfig,
    ) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                address,
                transport,
                handlers,
                pending: PendingTable::default(),
                in_flight: DashSet::new(),
                request_timeout: Duration::from_millis(config.request_timeout_ms),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Address of the context owning this router.
    pub fn address(&self) -> ContextAddress {
        self.inner.address
    }

    /// Number of requests still waiting for a response.
    pub fn outstanding(&self) -> usize {
        self.inner.pending.len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Send a request that expects a response.
    pub async fn send(
        &self,
        to: ContextAddress,
        action: &str,
        payload: Value,
    ) -> Result<PendingReply, RouterError> {
        if self.is_closed() {
            return Err(DeliveryError::ContextClosed.into());
        }

        let (correlation_id, rx) = self.inner.pending.register();
        let envelope = Envelope::request(action, payload, correlation_id.clone(), self.inner.address);
        debug!("{} -> {}: {} [{}]", self.inner.address, to, action, correlation_id);

        if let Err(e) = self.inner.transport.transmit(&to, &Message::Request(envelope)).await {
            self.inner.pending.remove(&correlation_id);
            return Err(e.into());
        }

        Ok(PendingReply::new(
            correlation_id,
            action.to_string(),
            rx,
            self.inner.pending.clone(),
            self.inner.request_timeout,
        ))
    }

    /// Send a request and wait for its response.
    pub async fn call(
        &self,
        to: ContextAddress,
        action: &str,
        payload: Value,
    ) -> Result<Value, RouterError> {
        self.send(to, action, payload).await?.wait().await
    }

    /// Send a fire-and-forget notification.
    pub async fn notify(
        &self,
        to: ContextAddress,
        action: &str,
        payload: Value,
    ) -> Result<(), RouterError> {
        if self.is_closed() {
            return Err(DeliveryError::ContextClosed.into());
        }
        let envelope = Envelope::notification(action, payload, self.inner.address);
        debug!("{} -> {}: {} (notification)", self.inner.address, to, action);
        self.inner
            .transport
            .transmit(&to, &Message::Request(envelope))
            .await?;
        Ok(())
    }

    /// Handle one incoming frame.
    pub async fn on_message(&self, message: Message) {
        match message {
            Message::Response(response) => {
                let id = response.correlation_id.clone();
                if !self.inner.pending.resolve(response) {
                    warn!(
                        "{} dropping response for unknown or settled request {}",
                        self.inner.address, id
                    );
                }
            }
            Message::Request(envelope) => self.dispatch(envelope).await,
        }
    }

    async fn dispatch(&self, envelope: Envelope) {
        let Envelope {
            action,
            payload,
            correlation_id,
            origin_context,
        } = envelope;
        let handler = self.inner.handlers.resolve(&action).cloned();
        let request = HandlerRequest {
            action: action.clone(),
            payload,
            origin: origin_context,
        };

        let Some(correlation_id) = correlation_id else {
            match handler {
                Some(handler) => {
                    let router = self.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handler.handle(request, router).await {
                            warn!("Notification '{}' from {} failed: {}", action, origin_context, e);
                        }
                    });
                }
                None => {
                    warn!(
                        "{} has no handler for notification '{}' from {}, dropping",
                        self.inner.address, action, origin_context
                    );
                }
            }
            return;
        };

        let Some(handler) = handler else {
            debug!("{} has no handler for '{}'", self.inner.address, action);
            let error = RouterError::UnknownAction(action);
            self.respond(origin_context, ResponseEnvelope::err(correlation_id, error.to_string()))
                .await;
            return;
        };

        let key = (origin_context, correlation_id.clone());
        if !self.inner.in_flight.insert(key.clone()) {
            warn!(
                "{} dropping duplicate request {} for '{}' from {}",
                self.inner.address, correlation_id, action, origin_context
            );
            return;
        }

        let router = self.clone();
        tokio::spawn(async move {
            let handler_router = router.clone();
            let task = tokio::spawn(async move { handler.handle(request, handler_router).await });
            let response = match task.await {
                Ok(Ok(data)) => ResponseEnvelope::ok(correlation_id, data),
                Ok(Err(e)) => {
                    debug!("Handler for '{}' failed: {}", action, e);
                    ResponseEnvelope::err(correlation_id, e.to_string())
                }
                Err(join_error) => {
                    error!("Handler for '{}' aborted: {}", action, join_error);
                    let failure = RouterError::HandlerFailure(format!("handler for '{}' panicked", action));
                    ResponseEnvelope::err(correlation_id, failure.to_string())
                }
            };
            router.respond(origin_context, response).await;
            router.inner.in_flight.remove(&key);
        });
    }

    /// Transmit a response. A response the transport refuses to carry is
    /// replaced by a failure under the same correlation id.
    async fn respond(&self, to: ContextAddress, response: ResponseEnvelope) {
        let id = response.correlation_id.clone();
        let err = match self
            .inner
            .transport
            .transmit(&to, &Message::Response(response))
            .await
        {
            Ok(()) => return,
            Err(e) => e,
        };
        match err {
            DeliveryError::TooLarge { .. } | DeliveryError::Encoding(_) => {
                warn!("{} could not send response {} to {}: {}", self.inner.address, id, to, err);
                let fallback = ResponseEnvelope::err(
                    id.clone(),
                    format!("response could not be delivered: {}", err),
                );
                if let Err(e) = self.inner.transport.transmit(&to, &Message::Response(fallback)).await {
                    error!("{} could not deliver response {} to {}: {}", self.inner.address, id, to, e);
                }
            }
            other => {
                error!("{} could not deliver response {} to {}: {}", self.inner.address, id, to, other);
            }
        }
    }

    /// Stop accepting new sends and fail every outstanding waiter.
    pub fn shutdown(&self) -> usize {
        self.inner.closed.store(true, Ordering::SeqCst);
        let failed = self.inner.pending.fail_all(DeliveryError::ContextClosed);
        info!("Router for {} shut down, {} request(s) abandoned", self.inner.address, failed);
        failed
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
