//! Error types for the PageHands protocol layer.

mod capability;
mod dom;
mod handler;
mod parse;
mod pattern;
mod protocol;
mod router;
mod settings;

pub use capability::*;
pub use dom::*;
pub use handler::*;
pub use parse::*;
pub use pattern::*;
pub use protocol::*;
pub use router::*;
pub use settings::*;
