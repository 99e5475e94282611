//! # PageHands DOM
//!
//! An in-memory stand-in for a browser document.
//!
//! The tree is an arena of [`NodeKind`] entries addressed by [`NodeId`].
//! Elements keep a lower-cased tag, ordered attributes, an inline style map and
//! a live form value. On top of the tree this crate provides minimal CSS
//! selectors, bubbling events, child-list mutation observers, text
//! highlighting and find/replace, and page data extraction.

pub mod document;
pub mod events;
pub mod fixture;
pub mod html;
pub mod observer;
pub mod page_data;
pub mod selector;
pub mod styles;
pub mod text_index;

pub use document::{Document, Element, NodeId, NodeKind};
pub use events::{DispatchedEvent, Event, ListenerId, EVENT_LOG_CAPACITY};
pub use fixture::{ElementSpec, Fixture, NodeSpec};
pub use observer::{MutationRecord, ObserverId, MAX_PENDING_RECORDS};
pub use page_data::{PageAnalysis, PageData, PageStats};
pub use selector::Selector;
pub use styles::{ElementHighlightOptions, StyleSnapshot, CUSTOM_STYLE_ID};
pub use text_index::{
    find_and_replace, highlight, remove_highlight, try_find_and_replace, HighlightOptions,
    ReplaceOptions, DEFAULT_HIGHLIGHT_CLASS,
};

/// Tags whose text content is never rendered.
pub const NON_RENDERABLE_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];
