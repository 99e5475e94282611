//! Options surface.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use pagehands_config::{Config, Settings};
use pagehands_core::{ContextRuntime, Fabric, HandlerRegistry, Router};
use pagehands_protocols::settings::merge_partial;
use pagehands_protocols::{ContextAddress, NoticeLevel, Notifier};

use crate::error::RuntimeError;

/// Version stamped into exported settings.
pub const EXPORT_VERSION: &str = "1.0.0";

/// Settings pushed straight to the active tab when they change.
const LIVE_KEYS: [&str; 3] = ["theme", "toolbarPosition", "toolbarOpacity"];

/// Exported settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsExport {
    pub settings: Value,
    pub timestamp: i64,
    pub version: String,
}

/// Options surface: edits settings through the coordinator.
pub struct Options {
    runtime: ContextRuntime,
    settings: Mutex<Settings>,
    notifier: Arc<dyn Notifier>,
}

impl Options {
    /// Open the surface and load the current settings, falling back to
    /// defaults if the coordinator does not answer.
    pub async fn open(
        fabric: &Fabric,
        config: &Config,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, RuntimeError> {
        let runtime = ContextRuntime::start(
            ContextAddress::options(),
            fabric,
            HandlerRegistry::new(),
            &config.router,
        )?;
        let options = Self {
            runtime,
            settings: Mutex::new(Settings::default()),
            notifier,
        };
        if let Err(e) = options.reload().await {
            warn!("Options using default settings: {}", e);
        }
        Ok(options)
    }

    pub fn router(&self) -> &Router {
        self.runtime.router()
    }

    pub fn settings(&self) -> Settings {
        self.settings.lock().clone()
    }

    pub async fn reload(&self) -> Result<Settings, RuntimeError> {
        let value = self
            .router()
            .call(ContextAddress::coordinator(), "getSettings", Value::Null)
            .await?;
        let settings = Settings::from_value(value)?;
        *self.settings.lock() = settings.clone();
        Ok(settings)
    }

    /// Change one setting.
    ///
    /// Theme and toolbar changes are also pushed to the active tab; a missing
    /// tab is not an error.
    pub async fn update_setting(&self, key: &str, value: Value) -> Result<Settings, RuntimeError> {
        let mut partial = Map::new();
        partial.insert(key.to_string(), value);
        let partial = Value::Object(partial);

        let updated = {
            let mut current = self.settings.lock().to_value()?;
            merge_partial(&mut current, partial.clone())?;
            Settings::from_value(current)?
        };

        self.router()
            .call(ContextAddress::coordinator(), "updateSettings", partial.clone())
            .await?;
        *self.settings.lock() = updated.clone();

        if LIVE_KEYS.contains(&key) {
            let pushed = self
                .router()
                .call(
                    ContextAddress::coordinator(),
                    "tabCommand",
                    json!({"action": "updateSettings", "data": partial}),
                )
                .await;
            if let Err(e) = pushed {
                debug!("Setting '{}' not pushed to a tab: {}", key, e);
            }
        }

        self.notifier.show("Settings saved", NoticeLevel::Success);
        Ok(updated)
    }

    pub fn export(&self) -> Result<SettingsExport, RuntimeError> {
        let export = SettingsExport {
            settings: self.settings.lock().to_value()?,
            timestamp: chrono::Utc::now().timestamp_millis(),
            version: EXPORT_VERSION.to_string(),
        };
        self.notifier.show("Settings exported", NoticeLevel::Success);
        Ok(export)
    }

    /// Import an exported document. Missing keys take their defaults.
    pub async fn import(&self, json: &str) -> Result<Settings, RuntimeError> {
        let result = self.try_import(json).await;
        match &result {
            Ok(_) => self.notifier.show("Settings imported", NoticeLevel::Success),
            Err(e) => self
                .notifier
                .show(&format!("Import failed: {}", e), NoticeLevel::Error),
        }
        result
    }

    async fn try_import(&self, json: &str) -> Result<Settings, RuntimeError> {
        let document: Value = serde_json::from_str(json)
            .map_err(|e| RuntimeError::InvalidImport(e.to_string()))?;
        let imported = match document.get("settings") {
            Some(settings @ Value::Object(_)) => settings.clone(),
            _ => return Err(RuntimeError::InvalidImport("missing `settings`".to_string())),
        };

        let mut merged = Settings::default().to_value()?;
        merge_partial(&mut merged, imported)?;
        let settings = Settings::from_value(merged.clone())?;

        self.router()
            .call(ContextAddress::coordinator(), "updateSettings", merged)
            .await?;
        *self.settings.lock() = settings.clone();
        Ok(settings)
    }

    /// Restore defaults everywhere.
    pub async fn reset(&self) -> Result<Settings, RuntimeError> {
        let value = self
            .router()
            .call(ContextAddress::coordinator(), "resetSettings", Value::Null)
            .await?;
        let settings = Settings::from_value(value)?;
        *self.settings.lock() = settings.clone();
        self.notifier.show("Settings reset", NoticeLevel::Success);
        Ok(settings)
    }

    /// Clear everything the coordinator has stored; defaults come back.
    pub async fn clear_data(&self) -> Result<Settings, RuntimeError> {
        let value = self
            .router()
            .call(ContextAddress::coordinator(), "clearSettings", Value::Null)
            .await?;
        let settings = Settings::from_value(value)?;
        *self.settings.lock() = settings.clone();
        self.notifier.show("All data cleared", NoticeLevel::Success);
        Ok(settings)
    }

    pub fn close(&self) {
        self.runtime.unload();
    }
}
