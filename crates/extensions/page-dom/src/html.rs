//! HTML serialization for inspection and CLI output.

use crate::document::{Document, NodeId, NodeKind};

const VOID_TAGS: [&str; 8] = ["br", "hr", "img", "input", "link", "meta", "source", "wbr"];

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

impl Document {
    /// Serialize a node and its subtree.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_html(child, &mut out);
        }
        out
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        format!("<!DOCTYPE html>{}", self.inner_html(self.root()))
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match self.node(id) {
            Ok(NodeKind::Document) => {
                for &child in self.children(id) {
                    self.write_html(child, out);
                }
            }
            Ok(NodeKind::Text(text)) => {
                let raw = self
                    .parent(id)
                    .and_then(|p| self.tag(p))
                    .is_some_and(|t| t == "script" || t == "style");
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            Ok(NodeKind::Element(el)) => {
                out.push('<');
                out.push_str(el.tag());
                for (name, value) in el.attrs() {
                    out.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
                }
                let style = el.style_text();
                if !style.is_empty() {
                    out.push_str(&format!(" style=\"{}\"", escape_attr(&style)));
                }
                out.push('>');
                if el.tag() == "head" && !self.title().is_empty() {
                    out.push_str(&format!("<title>{}</title>", escape_text(self.title())));
                }
                if VOID_TAGS.contains(&el.tag()) {
                    return;
                }
                for &child in self.children(id) {
                    self.write_html(child, out);
                }
                out.push_str(&format!("</{}>", el.tag()));
            }
            Err(_) => {}
        }
    }
}
