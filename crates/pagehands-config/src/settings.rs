//! Typed user settings.
//!
//! Settings travel between contexts as a JSON object with camelCase keys.
//! Keys this version does not know about are kept in [`Settings::extra`] so a
//! round trip through the typed record never loses data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Colour theme of injected UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

/// User settings shared by every context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub enabled: bool,
    pub auto_run: bool,
    pub theme: Theme,
    pub notifications: bool,
    pub debug_mode: bool,
    pub data_collection: bool,
    pub enable_highlight: bool,
    pub enable_extract: bool,
    pub enable_screenshot: bool,
    pub enable_analyze: bool,
    pub enable_context_menu: bool,
    pub toolbar_position: String,
    pub toolbar_opacity: f64,
    pub enable_animations: bool,
    pub storage_type: String,
    pub data_retention: u32,
    pub performance_monitoring: bool,
    pub auto_update: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_run: false,
            theme: Theme::Light,
            notifications: true,
            debug_mode: false,
            data_collection: false,
            enable_highlight: true,
            enable_extract: true,
            enable_screenshot: true,
            enable_analyze: true,
            enable_context_menu: true,
            toolbar_position: "top-right".to_string(),
            toolbar_opacity: 0.9,
            enable_animations: true,
            storage_type: "local".to_string(),
            data_retention: 30,
            performance_monitoring: false,
            auto_update: true,
            extra: Map::new(),
        }
    }
}

impl Settings {
    /// Build settings from a stored object; missing keys take defaults.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize to the wire representation.
    pub fn to_value(&self) -> Result<Value, ConfigError> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.enabled);
        assert!(!settings.auto_run);
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.toolbar_position, "top-right");
        assert_eq!(settings.data_retention, 30);
    }

    #[test]
    fn test_camel_case_wire_names() {
        let value = Settings::default().to_value().unwrap();
        assert_eq!(value["autoRun"], json!(false));
        assert_eq!(value["enableContextMenu"], json!(true));
        assert_eq!(value["theme"], json!("light"));
    }

    #[test]
    fn test_partial_object_fills_defaults() {
        let settings = Settings::from_value(json!({"theme": "dark"})).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert!(settings.notifications);
    }

    #[test]
    fn test_unknown_keys_preserved() {
        let settings = Settings::from_value(json!({"customFlag": 7})).unwrap();
        assert_eq!(settings.extra.get("customFlag"), Some(&json!(7)));
        let value = settings.to_value().unwrap();
        assert_eq!(value["customFlag"], json!(7));
    }

    #[test]
    fn test_null_is_default() {
        assert_eq!(Settings::from_value(Value::Null).unwrap(), Settings::default());
    }

    #[test]
    fn test_wrong_type_rejected() {
        assert!(Settings::from_value(json!({"enabled": "yes"})).is_err());
    }
}
