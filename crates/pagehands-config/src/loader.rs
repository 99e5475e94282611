//! Configuration loader.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("valid env pattern"));

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file, falling back to defaults when it is missing.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Substitute `${VAR}` and `${VAR:-fallback}` references.
    ///
    /// An unset variable without a fallback is an error.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut missing = None;
        let expanded = ENV_VAR.replace_all(content, |caps: &regex::Captures<'_>| {
            match (std::env::var(&caps[1]), caps.get(2)) {
                (Ok(value), _) => value,
                (Err(_), Some(fallback)) => fallback.as_str().to_string(),
                (Err(_), None) => {
                    missing.get_or_insert_with(|| caps[1].to_string());
                    String::new()
                }
            }
        });
        match missing {
            Some(name) => Err(ConfigError::EnvVarNotSet(name)),
            None => Ok(expanded.into_owned()),
        }
    }

    /// Expand shell-style paths (e.g., `~/.pagehands`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    use crate::settings::Theme;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.router.request_timeout_ms, 30_000);
        assert_eq!(config.highlight.class_name, "plugin-highlight");
    }

    #[test]
    fn test_load_router_section() {
        let content = r#"
            [router]
            request_timeout_ms = 250
            max_message_bytes = 1024
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.router.request_timeout_ms, 250);
        assert_eq!(config.router.max_message_bytes, 1024);
    }

    #[test]
    fn test_load_settings_section() {
        let content = r#"
            [settings]
            theme = "dark"
            notifications = false
            toolbarOpacity = 0.5
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.settings.theme, Theme::Dark);
        assert!(!config.settings.notifications);
        assert!((config.settings.toolbar_opacity - 0.5).abs() < f64::EPSILON);
        assert!(config.settings.enabled);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[logging]").unwrap();
        writeln!(file, "level = \"debug\"").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/pagehands.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = ConfigLoader::load_or_default(Path::new("/nonexistent/pagehands.toml")).unwrap();
        assert_eq!(config.router.request_timeout_ms, 30_000);
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("PAGEHANDS_TEST_CONFIG_VAR", "test_value");
        }
        let content = "value = \"${PAGEHANDS_TEST_CONFIG_VAR}\"";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert!(expanded.contains("test_value"));
        unsafe {
            std::env::remove_var("PAGEHANDS_TEST_CONFIG_VAR");
        }
    }

    #[test]
    fn test_unset_var_is_reported_by_name() {
        let content = "dir = \"${PAGEHANDS_UNSET_LOG_DIR}\"";
        match ConfigLoader::expand_env_vars(content) {
            Err(ConfigError::EnvVarNotSet(name)) => assert_eq!(name, "PAGEHANDS_UNSET_LOG_DIR"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_unset_var_uses_fallback() {
        let content = r#"
            [logging]
            level = "${PAGEHANDS_UNSET_LEVEL:-warn}"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = ConfigLoader::expand_path("~/test");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/test"));
    }

    #[test]
    fn test_expand_path_no_tilde() {
        assert_eq!(ConfigLoader::expand_path("/var/log"), "/var/log");
    }
}
