//! Popup surface.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::debug;

use pagehands_autofill::{ResumeExtractor, ResumeInfo};
use pagehands_config::Config;
use pagehands_core::{ContextRuntime, Fabric, HandlerRegistry, Router};
use pagehands_protocols::{
    ContextAddress, DocumentParser, NoticeLevel, Notifier, ParseError, RouterError,
};

use crate::coordinator::MENU_SETTINGS;
use crate::error::RuntimeError;

/// The popup's current status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub message: String,
    pub level: NoticeLevel,
}

/// Popup surface: quick actions, resume parsing and form filling.
///
/// Talks only to the coordinator; commands for the page go through
/// `tabCommand`.
pub struct Popup {
    runtime: ContextRuntime,
    parser: Arc<dyn DocumentParser>,
    extractor: ResumeExtractor,
    notifier: Arc<dyn Notifier>,
    status: Mutex<Option<StatusMessage>>,
    resume: Mutex<Option<ResumeInfo>>,
}

impl Popup {
    pub fn open(
        fabric: &Fabric,
        config: &Config,
        parser: Arc<dyn DocumentParser>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, RuntimeError> {
        let runtime = ContextRuntime::start(
            ContextAddress::popup(),
            fabric,
            HandlerRegistry::new(),
            &config.router,
        )?;
        let popup = Self {
            runtime,
            parser,
            extractor: ResumeExtractor::new(),
            notifier,
            status: Mutex::new(None),
            resume: Mutex::new(None),
        };
        popup.show_status("Ready", NoticeLevel::Success);
        Ok(popup)
    }

    pub fn router(&self) -> &Router {
        self.runtime.router()
    }

    pub fn show_status(&self, message: impl Into<String>, level: NoticeLevel) {
        let message = message.into();
        self.notifier.show(&message, level);
        *self.status.lock() = Some(StatusMessage { message, level });
    }

    pub fn status(&self) -> Option<StatusMessage> {
        self.status.lock().clone()
    }

    pub fn resume(&self) -> Option<ResumeInfo> {
        self.resume.lock().clone()
    }

    async fn tab_command(&self, action: &str, data: Value) -> Result<Value, RouterError> {
        self.router()
            .call(
                ContextAddress::coordinator(),
                "tabCommand",
                json!({"action": action, "data": data}),
            )
            .await
    }

    /// Ask the coordinator whether it is alive.
    pub async fn check_background(&self) -> Result<Value, RuntimeError> {
        let result = self
            .router()
            .call(ContextAddress::coordinator(), "test", Value::Null)
            .await;
        match result {
            Ok(value) => {
                self.show_status("Background is working", NoticeLevel::Success);
                Ok(value)
            }
            Err(e) => {
                self.show_status(format!("Error: {}", e), NoticeLevel::Error);
                Err(e.into())
            }
        }
    }

    /// Send `action` to the active tab's mediator.
    pub async fn run_action(&self, action: &str) -> Result<Value, RuntimeError> {
        self.show_status(format!("Running: {}", action), NoticeLevel::Info);
        let data = json!({"timestamp": chrono::Utc::now().timestamp_millis()});
        match self.tab_command(action, data).await {
            Ok(value) => {
                self.show_status(format!("{} succeeded", action), NoticeLevel::Success);
                Ok(value)
            }
            Err(e) => {
                self.show_status(format!("Error: {}", e), NoticeLevel::Error);
                Err(e.into())
            }
        }
    }

    pub async fn open_settings(&self) -> Result<(), RuntimeError> {
        self.router()
            .call(
                ContextAddress::coordinator(),
                "menuClicked",
                json!({"menuItemId": MENU_SETTINGS}),
            )
            .await?;
        self.show_status("Settings opened", NoticeLevel::Success);
        Ok(())
    }

    /// Parse a document and extract resume fields from its text.
    pub fn load_document(&self, bytes: &[u8], media_type: &str) -> Result<ResumeInfo, RuntimeError> {
        if !self.parser.media_types().iter().any(|t| *t == media_type) {
            self.show_status(format!("Unsupported file type: {}", media_type), NoticeLevel::Error);
            return Err(ParseError::Unsupported(media_type.to_string()).into());
        }
        self.show_status("Parsing document...", NoticeLevel::Info);
        let text = match self.parser.parse(bytes) {
            Ok(text) => text,
            Err(e) => {
                self.show_status(format!("Parsing failed: {}", e), NoticeLevel::Error);
                return Err(e.into());
            }
        };
        let info = self.extractor.extract(&text);
        debug!("Extracted {} resume fields", info.fields().len());
        *self.resume.lock() = Some(info.clone());
        self.show_status("Document parsed", NoticeLevel::Success);
        Ok(info)
    }

    /// Auto-fill `text` into the active tab's form fields.
    pub async fn fill_web_form(&self, text: &str) -> Result<Value, RuntimeError> {
        match self.tab_command("fillForm", json!({"text": text})).await {
            Ok(outcome) => {
                let filled = outcome["filledFields"].as_array().map_or(0, Vec::len);
                if filled > 0 {
                    self.show_status(format!("Filled {} form fields", filled), NoticeLevel::Success);
                } else {
                    self.show_status("No fillable form fields found", NoticeLevel::Info);
                }
                Ok(outcome)
            }
            Err(e) => {
                self.show_status(format!("Fill failed: {}", e), NoticeLevel::Error);
                Err(e.into())
            }
        }
    }

    /// Fill one field of the loaded resume, by key (e.g. `phone`).
    pub async fn fill_resume_field(&self, key: &str) -> Result<Value, RuntimeError> {
        let value = {
            let resume = self.resume.lock();
            let info = resume.as_ref().ok_or(RuntimeError::NoResume)?;
            info.fields()
                .into_iter()
                .find(|(k, _, _)| *k == key)
                .map(|(_, _, v)| v)
                .ok_or_else(|| RuntimeError::UnknownField(key.to_string()))?
        };
        self.fill_web_form(&value).await
    }

    /// Closing a surface has no protocol effect beyond dropping its mailbox.
    pub fn close(&self) {
        self.runtime.unload();
    }
}
