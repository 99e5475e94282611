//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const TOOLBAR_POSITIONS: [&str; 4] = ["top-left", "top-right", "bottom-left", "bottom-right"];

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_router(config, &mut result);
        Self::validate_highlight(config, &mut result);
        Self::validate_settings(config, &mut result);
        Self::validate_logging(config, &mut result);

        Ok(result)
    }

    fn validate_router(config: &Config, result: &mut ValidationResult) {
        if config.router.request_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "router.request_timeout_ms",
                "request_timeout_ms must be greater than 0",
            ));
        }

        if config.router.request_timeout_ms > 600_000 {
            result.add_warning(ValidationWarning::new(
                "router.request_timeout_ms",
                "request_timeout_ms is over 10 minutes, callers may appear hung",
            ));
        }

        if config.router.max_message_bytes == 0 {
            result.add_error(ValidationError::new(
                "router.max_message_bytes",
                "max_message_bytes must be greater than 0",
            ));
        }
    }

    fn validate_highlight(config: &Config, result: &mut ValidationResult) {
        let highlight = &config.highlight;
        for (path, color) in [
            ("highlight.backgroundColor", &highlight.background_color),
            ("highlight.foregroundColor", &highlight.foreground_color),
        ] {
            if color.trim().is_empty() {
                result.add_error(ValidationError::new(path, "Colour cannot be empty"));
            }
        }

        if highlight.class_name.trim().is_empty() {
            result.add_error(ValidationError::new(
                "highlight.className",
                "Marker class cannot be empty",
            ));
        } else if highlight.class_name.contains(char::is_whitespace) {
            result.add_error(ValidationError::new(
                "highlight.className",
                "Marker class must be a single class name",
            ));
        }
    }

    fn validate_settings(config: &Config, result: &mut ValidationResult) {
        let settings = &config.settings;
        if !(0.0..=1.0).contains(&settings.toolbar_opacity) {
            result.add_error(ValidationError::new(
                "settings.toolbarOpacity",
                "toolbarOpacity must be between 0 and 1",
            ));
        }

        if !TOOLBAR_POSITIONS.contains(&settings.toolbar_position.as_str()) {
            result.add_warning(ValidationWarning::new(
                "settings.toolbarPosition",
                format!(
                    "Unknown toolbar position '{}', valid values: {:?}",
                    settings.toolbar_position, TOOLBAR_POSITIONS
                ),
            ));
        }

        if settings.data_retention == 0 {
            result.add_warning(ValidationWarning::new(
                "settings.dataRetention",
                "dataRetention of 0 days discards collected data immediately",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let level = config.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!(
                    "'{}' is not a plain level, it will be used as a filter directive",
                    config.logging.level
                ),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
