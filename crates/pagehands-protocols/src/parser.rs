//! Document-parsing collaborator.

use crate::error::ParseError;

/// Turns a raw document buffer into plain text.
///
/// The classification engine consumes only the returned text.
pub trait DocumentParser: Send + Sync {
    /// Media types this parser accepts (e.g. `text/plain`).
    fn media_types(&self) -> &[&'static str];

    /// Extract plain text from `bytes`.
    fn parse(&self, bytes: &[u8]) -> Result<String, ParseError>;
}
