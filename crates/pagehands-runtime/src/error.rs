//! Runtime error types.

use thiserror::Error;

use pagehands_config::ConfigError;
use pagehands_protocols::{ParseError, RouterError, SettingsError};

/// Errors raised while starting contexts or driving UI surfaces.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Router(#[from] RouterError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid data format: {0}")]
    InvalidImport(String),

    #[error("No such tab: {0}")]
    NoSuchTab(u32),

    #[error("Tab already open: {0}")]
    TabExists(u32),

    #[error("No resume loaded")]
    NoResume,

    #[error("Resume field not found: {0}")]
    UnknownField(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_is_transparent() {
        let err: RuntimeError = RouterError::UnknownAction("zap".to_string()).into();
        assert_eq!(err.to_string(), "unknown action: zap");
    }

    #[test]
    fn test_invalid_import() {
        let err = RuntimeError::InvalidImport("missing `settings`".to_string());
        assert!(err.to_string().contains("missing `settings`"));
    }
}
