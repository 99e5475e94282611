//! # PageHands Config
//!
//! Configuration management for PageHands: the TOML config file read by the
//! binary and the typed settings record shared by every context.

mod error;
mod loader;
mod schema;
mod settings;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use settings::{Settings, Theme};
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
