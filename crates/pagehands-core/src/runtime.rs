//! Per-context runtime: mailbox pump, router and lifecycle.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use pagehands_config::RouterConfig;
use pagehands_protocols::{ContextAddress, Message, RouterError};

use crate::fabric::{Fabric, Mailbox};
use crate::lifecycle::{ContextState, Lifecycle};
use crate::registry::HandlerRegistry;
use crate::router::Router;

/// A running context attached to the fabric.
pub struct ContextRuntime {
    router: Router,
    fabric: Fabric,
    lifecycle: Arc<Lifecycle>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl ContextRuntime {
    /// Open the context's mailbox, freeze its handlers and start pumping frames.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        address: ContextAddress,
        fabric: &Fabric,
        handlers: HandlerRegistry,
        config: &RouterConfig,
    ) -> Result<Self, RouterError> {
        let mailbox = fabric.open(address)?;
        let router = Router::new(address, Arc::new(fabric.clone()), handlers.freeze(), config);
        let lifecycle = Arc::new(Lifecycle::new(address.to_string()));

        let pump = tokio::spawn(Self::pump(mailbox, router.clone()));
        lifecycle.mark_running();
        info!("Context {} running", address);

        Ok(Self {
            router,
            fabric: fabric.clone(),
            lifecycle,
            pump: Mutex::new(Some(pump)),
        })
    }

    async fn pump(mut mailbox: Mailbox, router: Router) {
        while let Some(frame) = mailbox.recv().await {
            match serde_json::from_str::<Message>(&frame) {
                Ok(message) => router.on_message(message).await,
                Err(e) => warn!("{} discarding malformed frame: {}", router.address(), e),
            }
        }
        debug!("Mailbox for {} drained", router.address());
    }

    pub fn address(&self) -> ContextAddress {
        self.router.address()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn lifecycle(&self) -> &Arc<Lifecycle> {
        &self.lifecycle
    }

    pub fn state(&self) -> ContextState {
        self.lifecycle.state()
    }

    /// Register a hook to run when the context unloads.
    pub fn on_teardown(&self, label: impl Into<String>, hook: impl FnOnce() + Send + 'static) {
        self.lifecycle.on_teardown(label, hook);
    }

    /// Unload the context.
    ///
    /// The mailbox closes first, so frames sent afterwards are unreachable;
    /// then teardown hooks run and outstanding waiters fail.
    pub fn unload(&self) {
        let address = self.address();
        self.fabric.close(&address);
        if self.lifecycle.teardown().is_none() {
            return;
        }
        self.router.shutdown();
        if let Some(pump) = self.pump.lock().take() {
            pump.abort();
        }
    }
}

impl Drop for ContextRuntime {
    fn drop(&mut self) {
        if self.lifecycle.state() != ContextState::Unloaded {
            self.unload();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use pagehands_protocols::DeliveryError;
    use serde_json::json;
    use std::time::Duration;

    fn echo_registry() -> HandlerRegistry {
        let registry = HandlerRegistry::new();
        registry
            .register(
                "echo",
                handler_fn(|req, _router| async move { Ok(req.payload) }),
            )
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_round_trip_between_contexts() {
        let fabric = Fabric::default();
        let config = RouterConfig::default();
        let server = ContextRuntime::start(
            ContextAddress::coordinator(),
            &fabric,
            echo_registry(),
            &config,
        )
        .unwrap();
        let client =
            ContextRuntime::start(ContextAddress::popup(), &fabric, HandlerRegistry::new(), &config)
                .unwrap();

        let value = client
            .router()
            .call(server.address(), "echo", json!({"n": 1}))
            .await
            .unwrap();
        assert_eq!(value, json!({"n": 1}));
        assert_eq!(client.router().outstanding(), 0);
    }

    #[tokio::test]
    async fn test_oversize_response_becomes_failure() {
        let fabric = Fabric::new(512);
        let config = RouterConfig {
            request_timeout_ms: 2000,
            ..RouterConfig::default()
        };
        let registry = HandlerRegistry::new();
        registry
            .register(
                "big",
                handler_fn(|_req, _router| async move { Ok(json!("x".repeat(4096))) }),
            )
            .unwrap();
        let server =
            ContextRuntime::start(ContextAddress::coordinator(), &fabric, registry, &config).unwrap();
        let client =
            ContextRuntime::start(ContextAddress::popup(), &fabric, HandlerRegistry::new(), &config)
                .unwrap();

        let err = client
            .router()
            .call(server.address(), "big", json!(null))
            .await
            .unwrap_err();
        match err {
            RouterError::Remote { action, message } => {
                assert_eq!(action, "big");
                assert!(message.starts_with("response could not be delivered"));
            }
            other => panic!("unexpected: {other}"),
        }
        assert_eq!(client.router().outstanding(), 0);
    }

    #[tokio::test]
    async fn test_unload_makes_context_unreachable() {
        let fabric = Fabric::default();
        let config = RouterConfig::default();
        let server =
            ContextRuntime::start(ContextAddress::mediator(1), &fabric, echo_registry(), &config)
                .unwrap();
        let client =
            ContextRuntime::start(ContextAddress::popup(), &fabric, HandlerRegistry::new(), &config)
                .unwrap();

        server.unload();
        assert_eq!(server.state(), ContextState::Unloaded);

        let err = client
            .router()
            .call(ContextAddress::mediator(1), "echo", json!(null))
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::Delivery(DeliveryError::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_unload_fails_own_waiters() {
        let fabric = Fabric::default();
        let config = RouterConfig::default();
        let registry = HandlerRegistry::new();
        registry
            .register(
                "hang",
                handler_fn(|_req, _router| async move {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(json!(null))
                }),
            )
            .unwrap();
        let hanging =
            ContextRuntime::start(ContextAddress::coordinator(), &fabric, registry, &config).unwrap();
        let caller =
            ContextRuntime::start(ContextAddress::popup(), &fabric, HandlerRegistry::new(), &config)
                .unwrap();

        let pending = caller
            .router()
            .send(hanging.address(), "hang", json!(null))
            .await
            .unwrap();
        caller.unload();

        let err = pending.wait().await.unwrap_err();
        assert!(matches!(err, RouterError::Delivery(DeliveryError::ContextClosed)));
    }

    #[tokio::test]
    async fn test_teardown_hooks_run_on_unload() {
        let fabric = Fabric::default();
        let runtime = ContextRuntime::start(
            ContextAddress::page_host(5),
            &fabric,
            HandlerRegistry::new(),
            &RouterConfig::default(),
        )
        .unwrap();
        let flag = Arc::new(Mutex::new(false));
        let hook_flag = flag.clone();
        runtime.on_teardown("flag", move || *hook_flag.lock() = true);

        runtime.unload();
        assert!(*flag.lock());
        assert!(!fabric.is_open(&ContextAddress::page_host(5)));
    }

    #[tokio::test]
    async fn test_malformed_frame_is_skipped() {
        let fabric = Fabric::default();
        let config = RouterConfig::default();
        let server =
            ContextRuntime::start(ContextAddress::coordinator(), &fabric, echo_registry(), &config)
                .unwrap();
        let client =
            ContextRuntime::start(ContextAddress::popup(), &fabric, HandlerRegistry::new(), &config)
                .unwrap();

        fabric
            .deliver(&server.address(), "not json".to_string())
            .unwrap();
        let value = client
            .router()
            .call(server.address(), "echo", json!("still alive"))
            .await
            .unwrap();
        assert_eq!(value, json!("still alive"));
    }

    #[tokio::test]
    async fn test_duplicate_address_rejected() {
        let fabric = Fabric::default();
        let config = RouterConfig::default();
        let _first =
            ContextRuntime::start(ContextAddress::coordinator(), &fabric, HandlerRegistry::new(), &config)
                .unwrap();
        let second =
            ContextRuntime::start(ContextAddress::coordinator(), &fabric, HandlerRegistry::new(), &config);
        assert!(matches!(second, Err(RouterError::AlreadyRegistered(_))));
    }
}
