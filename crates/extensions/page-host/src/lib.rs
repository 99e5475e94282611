//! # PageHands Page Host
//!
//! The capability host that runs in a page's own script environment. It
//! exposes a fixed set of named page operations to the page-attached
//! mediator of the same tab, and nothing else.
//!
//! ## Capabilities
//!
//! - `highlightText`, `removeHighlight` - text-leaf emphasis
//! - `extractPageData`, `analyzePage`, `getPageStats` - page summaries
//! - `findAndReplace` - text rewriting
//! - `addCustomStyles`, `removeCustomStyles` - injected stylesheet
//! - `scrollToElement`, `highlightElement` - single-element affordances
//!
//! Every capability is invoked as the router action `capability:<name>`.

mod args;
mod capability;
mod host;
mod table;

use std::sync::Arc;

use parking_lot::Mutex;
use pagehands_dom::Document;

pub use args::CapabilityArgs;
pub use capability::{Capability, ACTION_PREFIX};
pub use host::{PageHost, INJECTED_ACTION};
pub use table::{CapabilityContext, CapabilityTable};

/// The document shared by the mediator and page host of one tab.
pub type SharedDocument = Arc<Mutex<Document>>;

/// Wrap a document for sharing between a tab's contexts.
pub fn share(document: Document) -> SharedDocument {
    Arc::new(Mutex::new(document))
}
