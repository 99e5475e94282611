//! Minimal CSS selectors.
//!
//! Supported: `*`, `tag`, `#id`, `.class`, `[attr]`, `[attr=value]` (value
//! optionally quoted), compounds of those, and comma-separated lists.
//! Combinators are not supported.

use pagehands_protocols::DomError;

use crate::document::{Document, Element, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Compound {
    fn matches(&self, el: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !el.tag().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.id() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|(name, value)| match (el.attr(name), value) {
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == expected,
            (None, _) => false,
        })
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let invalid = || DomError::InvalidSelector(input.to_string());
        let mut alternatives = Vec::new();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid());
            }
            alternatives.push(Self::parse_compound(part).ok_or_else(invalid)?);
        }
        Ok(Self { alternatives })
    }

    fn parse_compound(text: &str) -> Option<Compound> {
        let chars: Vec<char> = text.chars().collect();
        let mut compound = Compound::default();
        let mut i = 0;

        let read_ident = |start: usize| -> (String, usize) {
            let mut end = start;
            while end < chars.len() && is_ident_char(chars[end]) {
                end += 1;
            }
            (chars[start..end].iter().collect(), end)
        };

        if i < chars.len() && chars[i] == '*' {
            i += 1;
        } else if i < chars.len() && is_ident_char(chars[i]) {
            let (tag, end) = read_ident(i);
            compound.tag = Some(tag.to_ascii_lowercase());
            i = end;
        }

        while i < chars.len() {
            match chars[i] {
                '#' => {
                    let (id, end) = read_ident(i + 1);
                    if id.is_empty() || compound.id.is_some() {
                        return None;
                    }
                    compound.id = Some(id);
                    i = end;
                }
                '.' => {
                    let (class, end) = read_ident(i + 1);
                    if class.is_empty() {
                        return None;
                    }
                    compound.classes.push(class);
                    i = end;
                }
                '[' => {
                    let close = chars[i..].iter().position(|&c| c == ']')? + i;
                    let inner: String = chars[i + 1..close].iter().collect();
                    compound.attrs.push(Self::parse_attr(&inner)?);
                    i = close + 1;
                }
                _ => return None,
            }
        }
        Some(compound)
    }

    fn parse_attr(inner: &str) -> Option<(String, Option<String>)> {
        match inner.split_once('=') {
            None => {
                let name = inner.trim();
                (!name.is_empty() && name.chars().all(is_ident_char))
                    .then(|| (name.to_ascii_lowercase(), None))
            }
            Some((name, value)) => {
                let name = name.trim();
                if name.is_empty() || !name.chars().all(is_ident_char) {
                    return None;
                }
                let value = value.trim();
                let unquoted = if value.len() >= 2
                    && ((value.starts_with('"') && value.ends_with('"'))
                        || (value.starts_with('\'') && value.ends_with('\'')))
                {
                    &value[1..value.len() - 1]
                } else {
                    value
                };
                Some((name.to_ascii_lowercase(), Some(unquoted.to_string())))
            }
        }
    }

    pub fn matches(&self, el: &Element) -> bool {
        self.alternatives.iter().any(|c| c.matches(el))
    }
}

impl Document {
    /// Attached elements matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(self.root())
            .into_iter()
            .filter(|&n| self.element(n).is_ok_and(|el| selector.matches(el)))
            .collect())
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    /// Whether an element matches `selector`.
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.element(id).is_ok_and(|el| selector.matches(el))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new("t", "");
        let body = doc.body();
        for (tag, attrs) in [
            ("input", vec![("type", "text"), ("name", "phone")]),
            ("input", vec![("type", "email"), ("id", "mail")]),
            ("textarea", vec![("class", "note big")]),
            ("label", vec![("for", "mail")]),
        ] {
            let el = doc.create_element(tag);
            for (k, v) in attrs {
                doc.set_attribute(el, k, v).unwrap();
            }
            doc.append_child(body, el).unwrap();
        }
        doc
    }

    #[test]
    fn test_tag_and_attribute() {
        let doc = sample();
        assert_eq!(doc.query_selector_all("input").unwrap().len(), 2);
        assert_eq!(doc.query_selector_all("input[type=\"text\"]").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("input[type=email]").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("[name]").unwrap().len(), 1);
    }

    #[test]
    fn test_id_and_class() {
        let doc = sample();
        assert_eq!(doc.query_selector_all("#mail").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all(".note").unwrap().len(), 1);
        assert_eq!(doc.query_selector_all("textarea.note.big").unwrap().len(), 1);
        assert!(doc.query_selector_all(".missing").unwrap().is_empty());
    }

    #[test]
    fn test_selector_list() {
        let doc = sample();
        let found = doc
            .query_selector_all("input[type='text'], input[type='email'], textarea")
            .unwrap();
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_universal() {
        let doc = sample();
        // html, head, body and the four children
        assert_eq!(doc.query_selector_all("*").unwrap().len(), 7);
    }

    #[test]
    fn test_label_for() {
        let doc = sample();
        assert!(doc.query_selector("label[for=\"mail\"]").unwrap().is_some());
    }

    #[test]
    fn test_invalid_selectors() {
        for bad in ["", "div p", "a,", "#", "[unclosed", "a>b"] {
            assert!(Selector::parse(bad).is_err(), "{bad} should be rejected");
        }
    }
}
