//! Document tree errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node {0} does not exist")]
    NoSuchNode(usize),

    #[error("Node {0} is not an element")]
    NotAnElement(usize),

    #[error("Node {0} is not attached to the document")]
    Detached(usize),

    #[error("<{tag}> does not hold a value")]
    NotAFormControl { tag: String },

    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),

    #[error("Invalid document fixture: {0}")]
    InvalidFixture(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_form_control() {
        let err = DomError::NotAFormControl {
            tag: "div".to_string(),
        };
        assert!(err.to_string().contains("<div>"));
    }
}
