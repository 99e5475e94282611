//! Privileged coordinator context.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use pagehands_config::Config;
use pagehands_core::{handler_fn, ContextRuntime, Fabric, HandlerRegistry, HandlerRequest, Router};
use pagehands_protocols::settings::merge_partial;
use pagehands_protocols::{ContextAddress, HandlerError, RouterError, SettingsStore};

use crate::error::RuntimeError;
use crate::tabs::TabRegistry;

/// Context menu entry: highlight the current selection.
pub const MENU_HIGHLIGHT: &str = "plugin-highlight";
/// Context menu entry: extract page data.
pub const MENU_EXTRACT: &str = "plugin-extract";
/// Context menu entry: open the options surface.
pub const MENU_SETTINGS: &str = "plugin-settings";

#[derive(Debug, Deserialize)]
struct TabCommand {
    #[serde(default)]
    tab: Option<u32>,
    action: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MenuClick {
    menu_item_id: String,
    #[serde(default)]
    tab: Option<u32>,
    #[serde(default)]
    selection_text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReadyReport {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
}

struct CoordinatorState {
    store: Arc<dyn SettingsStore>,
    defaults: Value,
    tabs: Arc<TabRegistry>,
}

impl CoordinatorState {
    /// Stored settings layered over the defaults.
    async fn settings(&self) -> Result<Value, HandlerError> {
        let mut merged = self.defaults.clone();
        let stored = self.store.get_settings().await?;
        if stored.is_object() {
            merge_partial(&mut merged, stored)?;
        }
        Ok(merged)
    }

    fn target_tab(&self, requested: Option<u32>) -> Result<u32, HandlerError> {
        requested
            .or_else(|| self.tabs.active())
            .ok_or_else(|| HandlerError::Failed("no active tab".to_string()))
    }

    async fn forward(
        &self,
        router: &Router,
        tab: u32,
        action: &str,
        data: Value,
    ) -> Result<Value, HandlerError> {
        debug!("Forwarding '{}' to tab {}", action, tab);
        router
            .call(ContextAddress::mediator(tab), action, data)
            .await
            .map_err(|e| match e {
                RouterError::Remote { message, .. } => HandlerError::Failed(message),
                other => HandlerError::Router(other),
            })
    }
}

fn parse<T: for<'de> Deserialize<'de>>(payload: Value) -> Result<T, HandlerError> {
    serde_json::from_value(payload).map_err(|e| HandlerError::InvalidPayload(e.to_string()))
}

fn sender_tab(request: &HandlerRequest) -> Result<u32, HandlerError> {
    request
        .origin
        .tab
        .ok_or_else(|| HandlerError::Forbidden(request.origin.to_string()))
}

fn registry(state: Arc<CoordinatorState>) -> Result<HandlerRegistry, RouterError> {
    let registry = HandlerRegistry::new();

    registry.register(
        "test",
        handler_fn(|_req, _router| async { Ok(json!({"message": "Background script is working"})) }),
    )?;

    let s = state.clone();
    registry.register(
        "getSettings",
        handler_fn(move |_req, _router| {
            let s = s.clone();
            async move { s.settings().await }
        }),
    )?;

    let s = state.clone();
    registry.register(
        "updateSettings",
        handler_fn(move |req, _router| {
            let s = s.clone();
            async move {
                if !req.payload.is_object() {
                    return Err(HandlerError::InvalidPayload(
                        "settings update must be an object".to_string(),
                    ));
                }
                s.store.set_settings(req.payload).await?;
                info!("Settings updated by {}", req.origin);
                s.settings().await
            }
        }),
    )?;

    let s = state.clone();
    registry.register(
        "resetSettings",
        handler_fn(move |req, _router| {
            let s = s.clone();
            async move {
                s.store.replace_settings(s.defaults.clone()).await?;
                info!("Settings reset by {}", req.origin);
                Ok(s.defaults.clone())
            }
        }),
    )?;

    let s = state.clone();
    registry.register(
        "clearSettings",
        handler_fn(move |req, _router| {
            let s = s.clone();
            async move {
                s.store.replace_settings(s.defaults.clone()).await?;
                s.tabs.clear_records();
                info!("Stored data cleared by {}", req.origin);
                Ok(s.defaults.clone())
            }
        }),
    )?;

    let s = state.clone();
    registry.register(
        "contentScriptReady",
        handler_fn(move |req, _router| {
            let s = s.clone();
            async move {
                let tab = sender_tab(&req)?;
                let report: ReadyReport = parse(req.payload).unwrap_or_default();
                info!("Tab {} ready: {}", tab, report.url);
                s.tabs.ready(tab, report.url, report.title);
                Ok(Value::Null)
            }
        }),
    )?;

    let s = state.clone();
    registry.register(
        "actionCompleted",
        handler_fn(move |req, _router| {
            let s = s.clone();
            async move {
                let tab = sender_tab(&req)?;
                info!("Action completed in tab {}", tab);
                s.tabs.record_action(tab, req.payload);
                Ok(Value::Null)
            }
        }),
    )?;

    let s = state.clone();
    registry.register(
        "dataExtracted",
        handler_fn(move |req, _router| {
            let s = s.clone();
            async move {
                let tab = sender_tab(&req)?;
                info!("Data extracted from tab {}", tab);
                s.tabs.record_extract(tab, req.payload);
                Ok(Value::Null)
            }
        }),
    )?;

    let s = state.clone();
    registry.register(
        "tabCommand",
        handler_fn(move |req, router| {
            let s = s.clone();
            async move {
                let command: TabCommand = parse(req.payload)?;
                let tab = s.target_tab(command.tab)?;
                s.forward(&router, tab, &command.action, command.data).await
            }
        }),
    )?;

    let s = state.clone();
    registry.register(
        "menuClicked",
        handler_fn(move |req, router| {
            let s = s.clone();
            async move {
                let click: MenuClick = parse(req.payload)?;
                info!("Menu item clicked: {}", click.menu_item_id);
                match click.menu_item_id.as_str() {
                    MENU_HIGHLIGHT => {
                        let text = click
                            .selection_text
                            .filter(|t| !t.is_empty())
                            .ok_or_else(|| HandlerError::InvalidPayload("no selection".to_string()))?;
                        let tab = s.target_tab(click.tab)?;
                        s.forward(&router, tab, "highlightText", json!({"text": text}))
                            .await
                    }
                    MENU_EXTRACT => {
                        let tab = s.target_tab(click.tab)?;
                        s.forward(&router, tab, "extractData", Value::Null).await
                    }
                    MENU_SETTINGS => {
                        info!("Opening options surface");
                        Ok(json!({"opened": "options"}))
                    }
                    other => Err(HandlerError::InvalidPayload(format!(
                        "unknown menu item: {}",
                        other
                    ))),
                }
            }
        }),
    )?;

    let s = state;
    registry.register(
        "listTabs",
        handler_fn(move |_req, _router| {
            let s = s.clone();
            async move { Ok(serde_json::to_value(s.tabs.list())?) }
        }),
    )?;

    Ok(registry)
}

/// The coordinator context.
pub struct Coordinator {
    runtime: ContextRuntime,
    store: Arc<dyn SettingsStore>,
    tabs: Arc<TabRegistry>,
}

impl Coordinator {
    /// Install default settings if the store is empty, then start listening.
    pub async fn start(
        fabric: &Fabric,
        store: Arc<dyn SettingsStore>,
        tabs: Arc<TabRegistry>,
        config: &Config,
    ) -> Result<Self, RuntimeError> {
        let defaults = config.settings.to_value()?;
        let stored = store.get_settings().await?;
        if stored.as_object().is_none_or(|map| map.is_empty()) {
            store.replace_settings(defaults.clone()).await?;
            info!("Default settings installed");
        }

        let state = Arc::new(CoordinatorState {
            store: store.clone(),
            defaults,
            tabs: tabs.clone(),
        });
        let runtime = ContextRuntime::start(
            ContextAddress::coordinator(),
            fabric,
            registry(state)?,
            &config.router,
        )?;

        Ok(Self {
            runtime,
            store,
            tabs,
        })
    }

    pub fn address(&self) -> ContextAddress {
        self.runtime.address()
    }

    pub fn router(&self) -> &Router {
        self.runtime.router()
    }

    pub fn tabs(&self) -> &Arc<TabRegistry> {
        &self.tabs
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    pub fn unload(&self) {
        self.runtime.unload();
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
