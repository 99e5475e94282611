//! Text search over the document body: highlight, unhighlight, find/replace.
//!
//! Matching works at whole-leaf granularity: a text node that contains the
//! term is wrapped or rewritten as a unit.

use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use pagehands_protocols::PatternError;

use crate::document::{Document, NodeId};

pub const DEFAULT_HIGHLIGHT_CLASS: &str = "plugin-highlight";

/// Options for [`highlight`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HighlightOptions {
    pub background_color: String,
    #[serde(alias = "color")]
    pub foreground_color: String,
    pub class_name: String,
    pub case_sensitive: bool,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            background_color: "#ffff00".to_string(),
            foreground_color: "#000000".to_string(),
            class_name: DEFAULT_HIGHLIGHT_CLASS.to_string(),
            case_sensitive: false,
        }
    }
}

/// Options for [`find_and_replace`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplaceOptions {
    pub case_sensitive: bool,
    pub whole_word: bool,
    #[serde(alias = "regex")]
    pub use_regex: bool,
}

/// Wrap every body text leaf containing `term` in a styled span.
///
/// Returns the number of leaves wrapped.
pub fn highlight(doc: &mut Document, term: &str, options: &HighlightOptions) -> usize {
    if term.is_empty() {
        return 0;
    }
    let needle = if options.case_sensitive {
        term.to_string()
    } else {
        term.to_lowercase()
    };

    let hits: Vec<(NodeId, String)> = doc
        .text_leaves(doc.body())
        .into_iter()
        .filter_map(|leaf| {
            let text = doc.text(leaf)?;
            let haystack = if options.case_sensitive {
                text.to_string()
            } else {
                text.to_lowercase()
            };
            haystack.contains(&needle).then(|| (leaf, text.to_string()))
        })
        .collect();

    let mut wrapped = 0;
    for (leaf, text) in hits {
        match wrap_leaf(doc, leaf, text, options) {
            Ok(()) => wrapped += 1,
            Err(e) => debug!("Skipping leaf {}: {}", leaf, e),
        }
    }
    debug!("Highlighted {} leaf(s) for '{}'", wrapped, term);
    wrapped
}

fn wrap_leaf(
    doc: &mut Document,
    leaf: NodeId,
    text: String,
    options: &HighlightOptions,
) -> Result<(), pagehands_protocols::DomError> {
    let span = doc.create_element("span");
    doc.set_attribute(span, "class", &options.class_name)?;
    doc.set_style(span, "background-color", &options.background_color)?;
    doc.set_style(span, "color", &options.foreground_color)?;
    doc.set_style(span, "padding", "2px 4px")?;
    doc.set_style(span, "border-radius", "3px")?;
    let inner = doc.create_text(text);
    doc.append_child(span, inner)?;
    doc.replace_child(leaf, span)
}

/// Replace every element carrying `class_name` with a plain text node.
///
/// Adjacent text is merged afterwards. Returns the number of elements removed.
pub fn remove_highlight(doc: &mut Document, class_name: &str) -> usize {
    let class_name = if class_name.is_empty() {
        DEFAULT_HIGHLIGHT_CLASS
    } else {
        class_name
    };
    let marked: Vec<NodeId> = doc
        .descendants(doc.root())
        .into_iter()
        .filter(|&n| doc.element(n).is_ok_and(|el| el.has_class(class_name)))
        .collect();

    let mut removed = 0;
    for element in marked {
        // Nested markers were detached along with their outer marker.
        if !doc.is_attached(element) {
            continue;
        }
        let Some(parent) = doc.parent(element) else {
            continue;
        };
        let text = doc.create_text(doc.text_content(element));
        if doc.replace_child(element, text).is_ok() {
            removed += 1;
            if let Err(e) = doc.normalize(parent) {
                debug!("Normalize after unhighlight failed: {}", e);
            }
        }
    }
    removed
}

/// Build the matcher used by [`find_and_replace`].
pub fn compile_matcher(find: &str, options: &ReplaceOptions) -> Result<Regex, PatternError> {
    let pattern = if options.use_regex {
        find.to_string()
    } else if options.whole_word {
        format!(r"\b{}\b", regex::escape(find))
    } else {
        regex::escape(find)
    };
    RegexBuilder::new(&pattern)
        .case_insensitive(!options.case_sensitive)
        .build()
        .map_err(|e| PatternError::new(find, e.to_string()))
}

/// Rewrite every renderable body text leaf matching `find`.
///
/// An invalid pattern is logged and leaves the document untouched. Returns the
/// number of leaves changed.
pub fn find_and_replace(
    doc: &mut Document,
    find: &str,
    replace: &str,
    options: &ReplaceOptions,
) -> usize {
    match try_find_and_replace(doc, find, replace, options) {
        Ok(count) => count,
        Err(e) => {
            warn!("{}", e);
            0
        }
    }
}

/// Like [`find_and_replace`] but surfaces pattern errors.
pub fn try_find_and_replace(
    doc: &mut Document,
    find: &str,
    replace: &str,
    options: &ReplaceOptions,
) -> Result<usize, PatternError> {
    if find.is_empty() {
        return Ok(0);
    }
    let matcher = compile_matcher(find, options)?;

    let mut changed = 0;
    for leaf in doc.text_leaves(doc.body()) {
        if doc.in_non_renderable(leaf) {
            continue;
        }
        let Some(original) = doc.text(leaf) else {
            continue;
        };
        let updated = if options.use_regex {
            matcher.replace_all(original, replace)
        } else {
            matcher.replace_all(original, NoExpand(replace))
        };
        if updated != original {
            let updated = updated.into_owned();
            if doc.set_text(leaf, updated).is_ok() {
                changed += 1;
            }
        }
    }
    debug!("Replaced matches of '{}' in {} leaf(s)", find, changed);
    Ok(changed)
}

#[cfg(test)]
#[path = "text_index_tests.rs"]
mod tests;
