//! Auto-fill engine.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use pagehands_dom::{Document, NodeId};
use pagehands_protocols::DomError;

use crate::classify::{classify, FieldKind};
use crate::descriptor::{candidate_fields, FieldDescriptor};

/// A field that received a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledField {
    pub field_identifier: String,
    pub value: String,
    pub field_type: String,
}

/// Result of one auto-fill pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillOutcome {
    pub classification: FieldKind,
    pub filled_fields: Vec<FilledField>,
}

impl FillOutcome {
    pub fn is_empty(&self) -> bool {
        self.filled_fields.is_empty()
    }
}

fn field_identifier(doc: &Document, node: NodeId) -> String {
    ["name", "id"]
        .iter()
        .filter_map(|attr| doc.get_attribute(node, attr))
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn field_type(doc: &Document, node: NodeId) -> String {
    if doc.tag(node) == Some("textarea") {
        return "textarea".to_string();
    }
    doc.get_attribute(node, "type")
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
        .unwrap_or_else(|| "text".to_string())
}

fn fill_one(doc: &mut Document, node: NodeId, value: &str) -> Result<FilledField, DomError> {
    doc.set_value(node, value)?;
    doc.dispatch_event(node, "input", true)?;
    doc.dispatch_event(node, "change", true)?;
    Ok(FilledField {
        field_identifier: field_identifier(doc, node),
        value: value.to_string(),
        field_type: field_type(doc, node),
    })
}

/// Classify `value` and write it into every field whose fingerprint carries
/// one of the classification's keywords.
///
/// An unclassified value writes nothing. A field that fails to accept the
/// value is skipped.
pub fn auto_fill(doc: &mut Document, value: &str) -> FillOutcome {
    let classification = classify(value);
    if !classification.is_classified() {
        debug!("value not classified, nothing to fill");
        return FillOutcome {
            classification,
            filled_fields: Vec::new(),
        };
    }

    let keywords = classification.keywords();
    let eligible: Vec<NodeId> = candidate_fields(doc)
        .into_iter()
        .filter(|&node| FieldDescriptor::describe(doc, node).matches_any(keywords))
        .collect();

    FillOutcome {
        classification,
        filled_fields: fill_nodes(doc, &eligible, value, classification),
    }
}

fn fill_nodes(
    doc: &mut Document,
    nodes: &[NodeId],
    value: &str,
    classification: FieldKind,
) -> Vec<FilledField> {
    let mut filled_fields = Vec::new();
    for &node in nodes {
        match fill_one(doc, node, value) {
            Ok(field) => {
                debug!(field = %field.field_identifier, kind = %classification, "filled field");
                filled_fields.push(field);
            }
            Err(e) => warn!(node, error = %e, "skipping field"),
        }
    }
    filled_fields
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn doc(body: &str) -> Document {
        Document::from_fixture_str(&format!(r#"{{"title": "t", "body": {body}}}"#)).unwrap()
    }

    #[test]
    fn test_phone_placeholder_filled() {
        let mut doc = doc(r#"[{"tag": "input", "attrs": {"placeholder": "Your phone", "name": "contact"}}]"#);
        let outcome = auto_fill(&mut doc, "13812345678");
        assert_eq!(outcome.classification, FieldKind::Phone);
        assert_eq!(
            outcome.filled_fields,
            vec![FilledField {
                field_identifier: "contact".into(),
                value: "13812345678".into(),
                field_type: "text".into(),
            }]
        );
        let input = doc.elements_by_tag("input")[0];
        assert_eq!(doc.value(input).unwrap(), "13812345678");
    }

    #[test]
    fn test_name_field_only_gets_nothing_for_phone() {
        let mut doc = doc(r#"[{"tag": "input", "attrs": {"placeholder": "Your name"}}]"#);
        let outcome = auto_fill(&mut doc, "13812345678");
        assert!(outcome.is_empty());
        let input = doc.elements_by_tag("input")[0];
        assert_eq!(doc.value(input).unwrap(), "");
    }

    #[test]
    fn test_unclassified_writes_nothing() {
        let mut doc = doc(r#"[{"tag": "input", "attrs": {"name": "phone"}}]"#);
        let outcome = auto_fill(&mut doc, "random!!text##");
        assert_eq!(outcome.classification, FieldKind::Unclassified);
        assert!(outcome.is_empty());
        assert!(doc.dispatched_events().is_empty());
    }

    #[test]
    fn test_same_value_into_several_fields() {
        let mut doc = doc(
            r#"[
                {"tag": "input", "attrs": {"type": "tel", "id": "mobile-tel"}},
                {"tag": "label", "text": "联系电话"},
                {"tag": "textarea", "attrs": {}},
                {"tag": "input", "attrs": {"name": "email"}}
            ]"#,
        );
        let outcome = auto_fill(&mut doc, "13812345678");
        let ids: Vec<(&str, &str)> = outcome
            .filled_fields
            .iter()
            .map(|f| (f.field_identifier.as_str(), f.field_type.as_str()))
            .collect();
        assert_eq!(ids, vec![("mobile-tel", "tel"), ("unknown", "textarea")]);
    }

    #[test]
    fn test_events_bubble_in_order() {
        let mut doc = doc(r#"[{"tag": "form", "children": [{"tag": "input", "attrs": {"name": "email"}}]}]"#);
        let form = doc.elements_by_tag("form")[0];
        let seen = Arc::new(AtomicUsize::new(0));
        for event in ["input", "change"] {
            let seen = seen.clone();
            doc.add_event_listener(form, event, move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        let outcome = auto_fill(&mut doc, "a@b.com");
        assert_eq!(outcome.filled_fields.len(), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        let kinds: Vec<&str> = doc
            .dispatched_events()
            .iter()
            .map(|e| e.event_type.as_str())
            .collect();
        assert_eq!(kinds, vec!["input", "change"]);
    }

    #[test]
    fn test_rejected_field_does_not_stop_later_fields() {
        let mut doc = doc(
            r#"[
                {"tag": "div", "attrs": {"id": "phone-box"}},
                {"tag": "input", "attrs": {"type": "tel", "name": "mobile"}}
            ]"#,
        );
        let div = doc.elements_by_tag("div")[0];
        let input = doc.elements_by_tag("input")[0];

        let filled = fill_nodes(&mut doc, &[div, 9999, input], "13812345678", FieldKind::Phone);
        assert_eq!(filled.len(), 1);
        assert_eq!(filled[0].field_identifier, "mobile");
        assert_eq!(doc.value(input).unwrap(), "13812345678");
        let targets: Vec<NodeId> = doc.dispatched_events().iter().map(|e| e.target).collect();
        assert_eq!(targets, vec![input, input]);
    }

    #[test]
    fn test_outcome_serializes_camel_case() {
        let mut doc = doc(r#"[{"tag": "input", "attrs": {"name": "birth"}}]"#);
        let outcome = auto_fill(&mut doc, "2023-05-01");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["classification"], "date");
        assert_eq!(json["filledFields"][0]["fieldIdentifier"], "birth");
        assert_eq!(json["filledFields"][0]["fieldType"], "text");
    }
}
