//! Custom style injection and element emphasis.

use serde::{Deserialize, Serialize};

use pagehands_protocols::DomError;

use crate::document::{Document, NodeId};

/// Id of the `<style>` element holding injected CSS.
pub const CUSTOM_STYLE_ID: &str = "pagehands-custom-styles";

/// Options for [`Document::highlight_element`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementHighlightOptions {
    pub background_color: String,
    pub border: String,
    /// Milliseconds before the original style is restored; 0 keeps it.
    pub duration: u64,
}

impl Default for ElementHighlightOptions {
    fn default() -> Self {
        Self {
            background_color: "#ffff00".to_string(),
            border: "2px solid #ff0000".to_string(),
            duration: 3000,
        }
    }
}

/// Inline style values captured before emphasis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSnapshot {
    pub node: NodeId,
    pub background_color: Option<String>,
    pub border: Option<String>,
}

impl Document {
    /// Install or replace the injected stylesheet. Returns its node.
    pub fn add_custom_styles(&mut self, css: &str) -> Result<NodeId, DomError> {
        let style = match self.get_element_by_id(CUSTOM_STYLE_ID) {
            Some(existing) => existing,
            None => {
                let style = self.create_element("style");
                self.set_attribute(style, "id", CUSTOM_STYLE_ID)?;
                let head = self.head();
                self.append_child(head, style)?;
                style
            }
        };
        self.clear_children(style)?;
        let text = self.create_text(css);
        self.append_child(style, text)?;
        Ok(style)
    }

    /// Remove the injected stylesheet, if present.
    pub fn remove_custom_styles(&mut self) -> Result<bool, DomError> {
        match self.get_element_by_id(CUSTOM_STYLE_ID) {
            Some(style) => {
                self.remove(style)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Scroll the first match of `selector` into view.
    pub fn scroll_to_element(&mut self, selector: &str) -> Result<bool, DomError> {
        match self.query_selector(selector)? {
            Some(element) => {
                self.scroll_into_view(element)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Emphasize the first match of `selector`.
    ///
    /// Returns the previous inline values so the caller can restore them.
    pub fn highlight_element(
        &mut self,
        selector: &str,
        options: &ElementHighlightOptions,
    ) -> Result<Option<StyleSnapshot>, DomError> {
        let Some(element) = self.query_selector(selector)? else {
            return Ok(None);
        };
        let snapshot = StyleSnapshot {
            node: element,
            background_color: self.style(element, "background-color"),
            border: self.style(element, "border"),
        };
        self.set_style(element, "background-color", &options.background_color)?;
        self.set_style(element, "border", &options.border)?;
        Ok(Some(snapshot))
    }

    /// Put back the inline values captured by [`Document::highlight_element`].
    pub fn restore_style(&mut self, snapshot: &StyleSnapshot) -> Result<(), DomError> {
        self.set_style(
            snapshot.node,
            "background-color",
            snapshot.background_color.as_deref().unwrap_or(""),
        )?;
        self.set_style(snapshot.node, "border", snapshot.border.as_deref().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::from_fixture_str(
            r#"{"body": [
                {"tag": "div", "attrs": {"id": "a", "style": "border: 1px solid black"}},
                {"tag": "div", "attrs": {"class": "b"}}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_custom_styles_replace_and_remove() {
        let mut doc = doc();
        let first = doc.add_custom_styles("p { color: red }").unwrap();
        let second = doc.add_custom_styles("p { color: blue }").unwrap();
        assert_eq!(first, second);
        assert_eq!(doc.text_content(second), "p { color: blue }");
        assert_eq!(doc.parent(second), Some(doc.head()));

        assert!(doc.remove_custom_styles().unwrap());
        assert!(!doc.remove_custom_styles().unwrap());
        assert!(doc.get_element_by_id(CUSTOM_STYLE_ID).is_none());
    }

    #[test]
    fn test_scroll_to_element() {
        let mut doc = doc();
        assert!(doc.scroll_to_element(".b").unwrap());
        assert_eq!(doc.scrolled_to(), doc.query_selector(".b").unwrap());
        assert!(!doc.scroll_to_element(".missing").unwrap());
        assert!(doc.scroll_to_element("div p").is_err());
    }

    #[test]
    fn test_highlight_and_restore_element() {
        let mut doc = doc();
        let snapshot = doc
            .highlight_element("#a", &ElementHighlightOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(doc.style(snapshot.node, "border").as_deref(), Some("2px solid #ff0000"));
        assert_eq!(doc.style(snapshot.node, "background-color").as_deref(), Some("#ffff00"));

        doc.restore_style(&snapshot).unwrap();
        assert_eq!(doc.style(snapshot.node, "border").as_deref(), Some("1px solid black"));
        assert_eq!(doc.style(snapshot.node, "background-color"), None);
    }

    #[test]
    fn test_highlight_missing_element() {
        let mut doc = doc();
        let result = doc
            .highlight_element("#nope", &ElementHighlightOptions::default())
            .unwrap();
        assert!(result.is_none());
    }
}
