//! JSON document fixtures.
//!
//! ```json
//! {
//!   "title": "Sign up",
//!   "url": "https://example.com/signup",
//!   "head": [{"tag": "meta", "attrs": {"name": "description", "content": "..."}}],
//!   "body": ["plain text", {"tag": "input", "attrs": {"name": "phone"}}]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use pagehands_protocols::DomError;

use crate::document::{Document, NodeId};

/// Whole-document fixture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub head: Vec<NodeSpec>,
    #[serde(default)]
    pub body: Vec<NodeSpec>,
}

/// A text node or an element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Text(String),
    Element(ElementSpec),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, Value>,
    /// Shorthand for a single leading text child.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

fn attr_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl Document {
    /// Build a document from a JSON fixture string.
    pub fn from_fixture_str(json: &str) -> Result<Self, DomError> {
        let fixture: Fixture =
            serde_json::from_str(json).map_err(|e| DomError::InvalidFixture(e.to_string()))?;
        Self::from_fixture(&fixture)
    }

    pub fn from_fixture(fixture: &Fixture) -> Result<Self, DomError> {
        let mut doc = Document::new(fixture.title.clone(), fixture.url.clone());
        let (head, body) = (doc.head(), doc.body());
        for spec in &fixture.head {
            doc.build(head, spec)?;
        }
        for spec in &fixture.body {
            doc.build(body, spec)?;
        }
        Ok(doc)
    }

    /// Append the subtree described by `spec` under `parent`.
    pub fn build(&mut self, parent: NodeId, spec: &NodeSpec) -> Result<NodeId, DomError> {
        match spec {
            NodeSpec::Text(text) => {
                let node = self.create_text(text.clone());
                self.append_child(parent, node)?;
                Ok(node)
            }
            NodeSpec::Element(el) => {
                if el.tag.trim().is_empty() {
                    return Err(DomError::InvalidFixture("element without a tag".to_string()));
                }
                let node = self.create_element(el.tag.trim());
                for (name, value) in &el.attrs {
                    self.set_attribute(node, name, &attr_string(value))?;
                }
                if let Some(text) = &el.text {
                    let text_node = self.create_text(text.clone());
                    self.append_child(node, text_node)?;
                }
                for child in &el.children {
                    self.build(node, child)?;
                }
                self.append_child(parent, node)?;
                Ok(node)
            }
        }
    }
}
