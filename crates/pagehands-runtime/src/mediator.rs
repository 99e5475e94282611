//! Page-attached mediator context.
//!
//! One mediator runs per tab. It owns the tab's affordance state (settings,
//! visibility, whether the page host has announced itself), performs DOM
//! work directly on the shared document, and forwards `capability:` calls
//! to the tab's page host.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use pagehands_autofill::auto_fill;
use pagehands_config::{Config, Settings, Theme};
use pagehands_core::{handler_fn, ContextRuntime, Fabric, HandlerRegistry, Router};
use pagehands_dom::{highlight, HighlightOptions, ObserverId};
use pagehands_page_host::{SharedDocument, ACTION_PREFIX, INJECTED_ACTION};
use pagehands_protocols::settings::merge_partial;
use pagehands_protocols::{ContextAddress, HandlerError, NoticeLevel, Notifier, RouterError};

use crate::error::RuntimeError;

const DARK_THEME_CLASS: &str = "plugin-dark-theme";
const SPECIAL_SITE: &str = "example.com";
const SPECIAL_SITE_CLASS: &str = "plugin-special-site";
const SPECIAL_SITE_CSS: &str = ".plugin-highlight { outline: 1px dashed #ff9800; }";
const PLUGIN_ACTION_TERM: &str = "重要";
const EXTRACT_TEXT_LIMIT: usize = 1000;

/// Form summary carried by `dataExtracted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSummary {
    pub action: String,
    pub method: String,
    pub inputs: Vec<String>,
}

/// Page summary produced by `extractData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedData {
    pub title: String,
    pub url: String,
    pub text: String,
    pub images: Vec<String>,
    pub links: Vec<String>,
    pub forms: Vec<FormSummary>,
}

#[derive(Debug, Deserialize)]
struct TextPayload {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SitePayload {
    #[serde(default)]
    site: String,
}

#[derive(Debug, Deserialize)]
struct ActionPayload {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

fn text_of(payload: Value) -> Option<String> {
    serde_json::from_value::<TextPayload>(payload)
        .ok()
        .and_then(|p| p.text)
        .filter(|t| !t.is_empty())
}

struct MediatorState {
    tab: u32,
    document: SharedDocument,
    settings: Mutex<Settings>,
    visible: AtomicBool,
    host_ready: AtomicBool,
    mutations: AtomicUsize,
    observer: Mutex<Option<ObserverId>>,
    highlight: HighlightOptions,
    notifier: Arc<dyn Notifier>,
}

impl MediatorState {
    fn notify_user(&self, message: &str, level: NoticeLevel) {
        if self.settings.lock().notifications {
            self.notifier.show(message, level);
        }
    }

    fn page_identity(&self) -> (String, String) {
        let doc = self.document.lock();
        (doc.url().to_string(), doc.title().to_string())
    }

    fn apply_settings(&self) -> Result<(), HandlerError> {
        let (dark, enabled) = {
            let settings = self.settings.lock();
            (settings.theme == Theme::Dark, settings.enabled)
        };
        let mut doc = self.document.lock();
        let body = doc.body();
        doc.toggle_class(body, DARK_THEME_CLASS, dark)?;
        self.visible.store(enabled, Ordering::SeqCst);
        Ok(())
    }

    fn merge_settings(&self, partial: Value) -> Result<Value, HandlerError> {
        let mut settings = self.settings.lock();
        let mut current = settings
            .to_value()
            .map_err(|e| HandlerError::Failed(e.to_string()))?;
        merge_partial(&mut current, partial)?;
        *settings = Settings::from_value(current.clone())
            .map_err(|e| HandlerError::InvalidPayload(e.to_string()))?;
        Ok(current)
    }

    fn highlight_text(&self, text: &str) -> usize {
        let count = highlight(&mut self.document.lock(), text, &self.highlight);
        self.notify_user(&format!("Highlighted \"{}\"", text), NoticeLevel::Info);
        count
    }

    fn special_handling(&self, site: &str) -> Result<bool, HandlerError> {
        if site != SPECIAL_SITE {
            debug!("No special handling for {}", site);
            return Ok(false);
        }
        let mut doc = self.document.lock();
        doc.add_custom_styles(SPECIAL_SITE_CSS)?;
        let body = doc.body();
        doc.add_class(body, SPECIAL_SITE_CLASS)?;
        Ok(true)
    }

    fn extract(&self) -> ExtractedData {
        let data = self.document.lock().extract_page_data();
        ExtractedData {
            title: data.title,
            url: data.url,
            text: data.text.chars().take(EXTRACT_TEXT_LIMIT).collect(),
            images: data.images.into_iter().map(|i| i.src).collect(),
            links: data.links.into_iter().map(|l| l.href).collect(),
            forms: data
                .forms
                .into_iter()
                .map(|f| FormSummary {
                    action: f.action,
                    method: f.method,
                    inputs: f.inputs.into_iter().map(|i| i.name).collect(),
                })
                .collect(),
        }
    }

    fn action_report(&self) -> Value {
        let doc = self.document.lock();
        json!({
            "url": doc.url(),
            "title": doc.title(),
            "timestamp": chrono::Utc::now().timestamp_millis(),
            "elements": doc.elements().len(),
        })
    }

    fn toggle(&self) -> bool {
        !self.visible.fetch_xor(true, Ordering::SeqCst)
    }

    /// Total child-list changes seen, counting records the observer discarded.
    fn drain_mutations(&self) -> usize {
        let mut dropped = 0;
        if let Some(observer) = *self.observer.lock() {
            let mut doc = self.document.lock();
            let records = doc.take_records(observer);
            dropped = doc.dropped_records(observer);
            self.mutations.fetch_add(records.len(), Ordering::SeqCst);
        }
        self.mutations.load(Ordering::SeqCst) + dropped
    }

    fn page_info(&self) -> Value {
        let mutations = self.drain_mutations();
        let doc = self.document.lock();
        json!({
            "tab": self.tab,
            "url": doc.url(),
            "title": doc.title(),
            "elementCount": doc.elements().len(),
            "visible": self.visible.load(Ordering::SeqCst),
            "hostReady": self.host_ready.load(Ordering::SeqCst),
            "mutations": mutations,
        })
    }

    async fn report_action(&self, router: &Router) -> Value {
        let report = self.action_report();
        if let Err(e) = router
            .notify(ContextAddress::coordinator(), "actionCompleted", report.clone())
            .await
        {
            warn!("actionCompleted not delivered: {}", e);
        }
        self.notify_user("Action performed", NoticeLevel::Success);
        report
    }

    async fn extract_and_report(&self, router: &Router) -> Result<Value, HandlerError> {
        let data = serde_json::to_value(self.extract())?;
        if let Err(e) = router
            .notify(ContextAddress::coordinator(), "dataExtracted", data.clone())
            .await
        {
            warn!("dataExtracted not delivered: {}", e);
        }
        self.notify_user("Page data extracted", NoticeLevel::Success);
        Ok(data)
    }
}

fn registry(state: Arc<MediatorState>) -> Result<HandlerRegistry, RouterError> {
    let registry = HandlerRegistry::new();

    let s = state.clone();
    registry.register(
        "pluginAction1",
        handler_fn(move |_req, _router| {
            let s = s.clone();
            async move {
                let count = highlight(&mut s.document.lock(), PLUGIN_ACTION_TERM, &s.highlight);
                s.notify_user("Plugin action 1 executed", NoticeLevel::Success);
                Ok(json!({"highlighted": count}))
            }
        }),
    )?;

    let s = state.clone();
    registry.register(
        "specialHandling",
        handler_fn(move |req, _router| {
            let s = s.clone();
            async move {
                let payload: SitePayload = serde_json::from_value(req.payload)
                    .map_err(|e| HandlerError::InvalidPayload(e.to_string()))?;
                let handled = s.special_handling(&payload.site)?;
                Ok(json!({"handled": handled}))
            }
        }),
    )?;

    let s = state.clone();
    registry.register(
        "updateSettings",
        handler_fn(move |req, _router| {
            let s = s.clone();
            async move {
                let merged = s.merge_settings(req.payload)?;
                s.apply_settings()?;
                Ok(merged)
            }
        }),
    )?;

    let s = state.clone();
    registry.register(
        "performAction",
        handler_fn(move |req, router| {
            let s = s.clone();
            async move {
                let action: ActionPayload = serde_json::from_value(req.payload)
                    .map_err(|e| HandlerError::InvalidPayload(e.to_string()))?;
                match action.kind.as_str() {
                    "main" => Ok(s.report_action(&router).await),
                    "highlight" => {
                        let text = action
                            .text
                            .filter(|t| !t.is_empty())
                            .ok_or_else(|| HandlerError::InvalidPayload("no text to highlight".to_string()))?;
                        Ok(json!({"highlighted": s.highlight_text(&text)}))
                    }
                    "extract" => s.extract_and_report(&router).await,
                    "toggle" => Ok(json!({"visible": s.toggle()})),
                    "screenshot" => Err(HandlerError::Failed(
                        "screenshot capture is not available".to_string(),
                    )),
                    other => Err(HandlerError::InvalidPayload(format!("unknown action type: {}", other))),
                }
            }
        }),
    )?;

    let s = state.clone();
    registry.register(
        "fillForm",
        handler_fn(move |req, _router| {
            let s = s.clone();
            async move {
                let text = text_of(req.payload)
                    .ok_or_else(|| HandlerError::Failed("no text supplied to fill".to_string()))?;
                let outcome = auto_fill(&mut s.document.lock(), &text);
                if outcome.is_empty() {
                    s.notify_user("No fillable form fields found", NoticeLevel::Info);
                } else {
                    s.notify_user(
                        &format!("Filled {} form fields", outcome.filled_fields.len()),
                        NoticeLevel::Success,
                    );
                }
                Ok(serde_json::to_value(outcome)?)
            }
        }),
    )?;

    let s = state.clone();
    registry.register(
        "highlightText",
        handler_fn(move |req, _router| {
            let s = s.clone();
            async move {
                let count = match text_of(req.payload) {
                    Some(text) => s.highlight_text(&text),
                    None => 0,
                };
                Ok(json!({"highlighted": count}))
            }
        }),
    )?;

    let s = state.clone();
    registry.register(
        "extractData",
        handler_fn(move |_req, router| {
            let s = s.clone();
            async move { s.extract_and_report(&router).await }
        }),
    )?;

    let s = state.clone();
    registry.register(
        "toggle",
        handler_fn(move |_req, _router| {
            let s = s.clone();
            async move { Ok(json!({"visible": s.toggle()})) }
        }),
    )?;

    let s = state.clone();
    registry.register(
        "pageInfo",
        handler_fn(move |_req, _router| {
            let s = s.clone();
            async move { Ok(s.page_info()) }
        }),
    )?;

    let s = state.clone();
    registry.register(
        INJECTED_ACTION,
        handler_fn(move |req, _router| {
            let s = s.clone();
            async move {
                if req.origin != ContextAddress::page_host(s.tab) {
                    return Err(HandlerError::Forbidden(req.origin.to_string()));
                }
                s.host_ready.store(true, Ordering::SeqCst);
                debug!("Page host for tab {} injected", s.tab);
                Ok(Value::Null)
            }
        }),
    )?;

    let s = state;
    registry.register_prefix(
        ACTION_PREFIX,
        handler_fn(move |req, router| {
            let s = s.clone();
            async move {
                router
                    .call(ContextAddress::page_host(s.tab), &req.action, req.payload)
                    .await
                    .map_err(|e| match e {
                        RouterError::Remote { message, .. } => HandlerError::Failed(message),
                        other => HandlerError::Router(other),
                    })
            }
        }),
    )?;

    Ok(registry)
}

/// Mediator for one tab.
pub struct Mediator {
    runtime: ContextRuntime,
    state: Arc<MediatorState>,
}

impl Mediator {
    /// Start the mediator: observe the body, fetch settings (falling back to
    /// defaults when the coordinator cannot answer), apply them and report
    /// ready to the coordinator.
    pub async fn start(
        tab: u32,
        document: SharedDocument,
        fabric: &Fabric,
        config: &Config,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, RuntimeError> {
        let state = Arc::new(MediatorState {
            tab,
            document,
            settings: Mutex::new(Settings::default()),
            visible: AtomicBool::new(true),
            host_ready: AtomicBool::new(false),
            mutations: AtomicUsize::new(0),
            observer: Mutex::new(None),
            highlight: HighlightOptions {
                background_color: config.highlight.background_color.clone(),
                foreground_color: config.highlight.foreground_color.clone(),
                class_name: config.highlight.class_name.clone(),
                case_sensitive: config.highlight.case_sensitive,
            },
            notifier,
        });

        let runtime = ContextRuntime::start(
            ContextAddress::mediator(tab),
            fabric,
            registry(state.clone())?,
            &config.router,
        )?;

        let observer = {
            let mut doc = state.document.lock();
            let body = doc.body();
            doc.observe(body, true).ok()
        };
        *state.observer.lock() = observer;
        let teardown_state = state.clone();
        runtime.on_teardown("dom-observer", move || {
            if let Some(observer) = teardown_state.observer.lock().take() {
                teardown_state.document.lock().disconnect(observer);
            }
        });

        let fetched = runtime
            .router()
            .call(ContextAddress::coordinator(), "getSettings", Value::Null)
            .await
            .map_err(RuntimeError::from)
            .and_then(|value| Settings::from_value(value).map_err(RuntimeError::from));
        match fetched {
            Ok(settings) => *state.settings.lock() = settings,
            Err(e) => warn!("Tab {} using default settings: {}", tab, e),
        }
        if let Err(e) = state.apply_settings() {
            warn!("Tab {} could not apply settings: {}", tab, e);
        }

        let (url, title) = state.page_identity();
        if let Err(e) = runtime
            .router()
            .notify(
                ContextAddress::coordinator(),
                "contentScriptReady",
                json!({"url": url, "title": title}),
            )
            .await
        {
            warn!("contentScriptReady not delivered: {}", e);
        }
        info!("Mediator for tab {} initialized", tab);

        Ok(Self { runtime, state })
    }

    pub fn tab(&self) -> u32 {
        self.state.tab
    }

    pub fn address(&self) -> ContextAddress {
        self.runtime.address()
    }

    pub fn router(&self) -> &Router {
        self.runtime.router()
    }

    pub fn document(&self) -> &SharedDocument {
        &self.state.document
    }

    pub fn settings(&self) -> Settings {
        self.state.settings.lock().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible.load(Ordering::SeqCst)
    }

    pub fn host_ready(&self) -> bool {
        self.state.host_ready.load(Ordering::SeqCst)
    }

    /// Whether the body mutation observer is still connected.
    pub fn is_observing(&self) -> bool {
        self.state.observer.lock().is_some()
    }

    /// Tear the mediator down; observers disconnect and waiters fail.
    pub fn unload(&self) {
        self.runtime.unload();
        info!("Mediator for tab {} unloaded", self.state.tab);
    }
}
