//! # PageHands Auto-Fill
//!
//! Decides which form fields on an unknown page should receive a piece of
//! text, and fills them.
//!
//! - [`classify`] maps a value to a [`FieldKind`] with fixed-order patterns
//! - [`FieldDescriptor`] builds the searchable fingerprint of an input
//! - [`auto_fill`] writes the value into every eligible field
//! - [`ResumeExtractor`] pulls contact fields out of parsed resume text
//! - [`PlainTextParser`] is the UTF-8 document parser

mod classify;
mod descriptor;
mod engine;
mod parser;
mod resume;

pub use classify::{classify, FieldKind};
pub use descriptor::{candidate_fields, label_text, FieldDescriptor};
pub use engine::{auto_fill, FillOutcome, FilledField};
pub use parser::PlainTextParser;
pub use resume::{ResumeExtractor, ResumeInfo};
