//! Configuration schema definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::loader::ConfigLoader;
use crate::settings::Settings;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub highlight: HighlightConfig,

    /// Initial settings installed by the coordinator on first start.
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Router configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// How long a caller waits for a correlated response.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Upper bound on a serialized frame.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_max_message_bytes() -> usize {
    64 * 1024 * 1024
}

/// Defaults applied to text highlighting when a caller omits options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightConfig {
    #[serde(default = "default_background_color", alias = "background_color")]
    pub background_color: String,

    #[serde(default = "default_foreground_color", alias = "foreground_color")]
    pub foreground_color: String,

    #[serde(default = "default_class_name", alias = "class_name")]
    pub class_name: String,

    #[serde(default, alias = "case_sensitive")]
    pub case_sensitive: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            background_color: default_background_color(),
            foreground_color: default_foreground_color(),
            class_name: default_class_name(),
            case_sensitive: false,
        }
    }
}

fn default_background_color() -> String {
    "#ffff00".to_string()
}

fn default_foreground_color() -> String {
    "#000000".to_string()
}

fn default_class_name() -> String {
    "plugin-highlight".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to also write a daily-rotated log file.
    #[serde(default = "default_true")]
    pub file: bool,

    /// Log directory; defaults to `~/.pagehands/logs`.
    #[serde(default)]
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: true,
            dir: None,
        }
    }
}

impl LoggingConfig {
    /// Resolve the log directory, expanding `~`.
    pub fn resolved_dir(&self) -> PathBuf {
        match &self.dir {
            Some(dir) => PathBuf::from(ConfigLoader::expand_path(dir)),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".pagehands")
                .join("logs"),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
