//! Capability dispatch errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("capability not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments for {capability}: {message}")]
    InvalidArguments { capability: String, message: String },

    #[error("Capability {capability} failed: {message}")]
    Failed { capability: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let err = CapabilityError::NotFound("explode".to_string());
        assert!(err.to_string().contains("not found"));
        assert!(err.to_string().contains("explode"));
    }

    #[test]
    fn test_invalid_arguments() {
        let err = CapabilityError::InvalidArguments {
            capability: "highlightText".to_string(),
            message: "expected a string".to_string(),
        };
        assert!(err.to_string().contains("highlightText"));
        assert!(err.to_string().contains("expected a string"));
    }
}
