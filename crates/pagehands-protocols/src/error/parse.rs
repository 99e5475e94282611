//! Document parsing errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unsupported document type: {0}")]
    Unsupported(String),

    #[error("Document is empty")]
    Empty,

    #[error("Malformed document: {0}")]
    Malformed(String),
}
