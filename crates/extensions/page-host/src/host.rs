//! Page-context host: the capability table attached to the fabric.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use pagehands_config::Config;
use pagehands_core::{
    ActionHandler, ContextRuntime, ContextState, Fabric, HandlerRegistry, HandlerRequest, Router,
};
use pagehands_protocols::{ContextAddress, HandlerError, RouterError};

use crate::capability::{Capability, ACTION_PREFIX};
use crate::table::{CapabilityContext, CapabilityTable};
use crate::SharedDocument;

/// Notification sent to the mediator once the host is listening.
pub const INJECTED_ACTION: &str = "injected";

struct CapabilityHandler {
    table: Arc<CapabilityTable>,
    tab: u32,
}

#[async_trait]
impl ActionHandler for CapabilityHandler {
    async fn handle(&self, request: HandlerRequest, _router: Router) -> Result<Value, HandlerError> {
        if request.origin != ContextAddress::mediator(self.tab) {
            return Err(HandlerError::Forbidden(request.origin.to_string()));
        }
        let capability = Capability::from_action(&request.action)?;
        Ok(self.table.call(capability, request.payload)?)
    }
}

/// Capability host for one tab.
pub struct PageHost {
    runtime: ContextRuntime,
    table: Arc<CapabilityTable>,
}

impl PageHost {
    /// Build the capability table, attach to the fabric and announce
    /// readiness to the tab's mediator.
    pub async fn start(
        tab: u32,
        document: SharedDocument,
        fabric: &Fabric,
        config: &Config,
    ) -> Result<Self, RouterError> {
        let table = Arc::new(CapabilityTable::new(CapabilityContext::new(
            document,
            &config.highlight,
        )));

        let registry = HandlerRegistry::new();
        registry.register_prefix(
            ACTION_PREFIX,
            Arc::new(CapabilityHandler {
                table: table.clone(),
                tab,
            }),
        )?;

        let runtime =
            ContextRuntime::start(ContextAddress::page_host(tab), fabric, registry, &config.router)?;
        info!(
            "Page host for tab {} exposing {} capabilities",
            tab,
            table.capabilities().len()
        );

        let announce = json!({
            "timestamp": chrono::Utc::now().timestamp_millis(),
            "capabilities": table.capabilities().iter().map(|c| c.name()).collect::<Vec<_>>(),
        });
        if let Err(e) = runtime
            .router()
            .notify(ContextAddress::mediator(tab), INJECTED_ACTION, announce)
            .await
        {
            debug!("Injected notice for tab {} not delivered: {}", tab, e);
        }

        Ok(Self { runtime, table })
    }

    pub fn address(&self) -> ContextAddress {
        self.runtime.address()
    }

    pub fn router(&self) -> &Router {
        self.runtime.router()
    }

    pub fn table(&self) -> &CapabilityTable {
        &self.table
    }

    pub fn state(&self) -> ContextState {
        self.runtime.state()
    }

    pub fn unload(&self) {
        self.runtime.unload();
    }
}
