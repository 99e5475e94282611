//! Field descriptors and candidate enumeration.

use pagehands_dom::{Document, NodeId};

const TEXT_INPUT_TYPES: [&str; 3] = ["text", "email", "tel"];

/// Searchable description of one form field, lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub node: NodeId,
    pub name: String,
    pub id: String,
    pub placeholder: String,
    pub label: String,
}

impl FieldDescriptor {
    pub fn describe(doc: &Document, node: NodeId) -> Self {
        let attr = |name: &str| {
            doc.get_attribute(node, name)
                .unwrap_or_default()
                .to_lowercase()
        };
        Self {
            node,
            name: attr("name"),
            id: attr("id"),
            placeholder: attr("placeholder"),
            label: label_text(doc, node).unwrap_or_default().to_lowercase(),
        }
    }

    /// `name id placeholder label`, space separated.
    pub fn fingerprint(&self) -> String {
        format!("{} {} {} {}", self.name, self.id, self.placeholder, self.label)
    }

    pub fn matches_any(&self, keywords: &[&str]) -> bool {
        let fingerprint = self.fingerprint();
        keywords.iter().any(|k| fingerprint.contains(k))
    }
}

/// Text of the label associated with a field.
///
/// Lookup order: a `label[for=id]`, then an enclosing `label`, then a
/// `label` immediately preceding the field.
pub fn label_text(doc: &Document, node: NodeId) -> Option<String> {
    let explicit = doc.get_attribute(node, "id").filter(|id| !id.is_empty()).and_then(|id| {
        doc.elements_by_tag("label")
            .into_iter()
            .find(|&label| doc.get_attribute(label, "for").as_deref() == Some(id.as_str()))
    });
    let label = explicit
        .or_else(|| doc.closest(node, "label"))
        .or_else(|| {
            doc.previous_element_sibling(node)
                .filter(|&prev| doc.tag(prev) == Some("label"))
        })?;
    Some(doc.text_content(label).trim().to_string())
}

/// Inputs that accept free text, plus textareas, in document order.
///
/// An input without a `type` attribute counts as `text`.
pub fn candidate_fields(doc: &Document) -> Vec<NodeId> {
    doc.elements()
        .into_iter()
        .filter(|&node| match doc.tag(node) {
            Some("textarea") => true,
            Some("input") => {
                let kind = doc
                    .get_attribute(node, "type")
                    .map(|t| t.to_ascii_lowercase())
                    .unwrap_or_else(|| "text".to_string());
                TEXT_INPUT_TYPES.contains(&kind.as_str())
            }
            _ => false,
        })
        .collect()
}
