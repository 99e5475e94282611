//! Arena document tree.

use pagehands_protocols::DomError;

use crate::events::{DispatchedEvent, ListenerEntry};
use crate::observer::Observers;
use crate::NON_RENDERABLE_TAGS;

/// Index of a node in the document arena.
pub type NodeId = usize;

/// Element payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    style: Vec<(String, String)>,
    value: Option<String>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            style: Vec::new(),
            value: None,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attribute value; `style` is serialized from the inline style map.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn style_text(&self) -> String {
        self.style
            .iter()
            .map(|(k, v)| format!("{}: {};", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether the element carries a user-editable value.
    pub fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea" | "select")
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|(k, _)| k != name);
        before != self.attrs.len()
    }

    fn set_style(&mut self, property: &str, value: &str) {
        if value.is_empty() {
            self.style.retain(|(k, _)| k != property);
            return;
        }
        match self.style.iter_mut().find(|(k, _)| k == property) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.style.push((property.to_string(), value.to_string())),
        }
    }

    fn parse_style(&mut self, text: &str) {
        self.style.clear();
        for declaration in text.split(';') {
            if let Some((k, v)) = declaration.split_once(':') {
                let (k, v) = (k.trim(), v.trim());
                if !k.is_empty() && !v.is_empty() {
                    self.style.push((k.to_ascii_lowercase(), v.to_string()));
                }
            }
        }
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// A document: `#document > html > (head, body)`.
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    head: NodeId,
    body: NodeId,
    title: String,
    url: String,
    pub(crate) listeners: Vec<ListenerEntry>,
    pub(crate) next_listener: u64,
    pub(crate) events: Vec<DispatchedEvent>,
    pub(crate) observers: Observers,
    pub(crate) scrolled_to: Option<NodeId>,
}

impl Document {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            head: 0,
            body: 0,
            title: title.into(),
            url: url.into(),
            listeners: Vec::new(),
            next_listener: 1,
            events: Vec::new(),
            observers: Observers::default(),
            scrolled_to: None,
        };
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.link(0, html);
        doc.link(html, head);
        doc.link(html, body);
        doc.head = head;
        doc.body = body;
        doc
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node_ref(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id).ok_or(DomError::NoSuchNode(id))
    }

    pub fn node(&self, id: NodeId) -> Result<&NodeKind, DomError> {
        Ok(&self.node_ref(id)?.kind)
    }

    pub fn element(&self, id: NodeId) -> Result<&Element, DomError> {
        match self.node(id)? {
            NodeKind::Element(el) => Ok(el),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        match self.nodes.get_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Element(el)) => Ok(el),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::NoSuchNode(id)),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id), Ok(NodeKind::Element(_)))
    }

    /// Lower-cased tag of an element, `None` for other nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(Element::tag)
    }

    /// Content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.node(id) {
            Ok(NodeKind::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), DomError> {
        match self.nodes.get_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Text(existing)) => {
                *existing = text.into();
                Ok(())
            }
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::NoSuchNode(id)),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Whether `id` is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == 0 {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Node {
            kind: NodeKind::Element(Element::new(tag)),
            parent: None,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.nodes.push(Node {
            kind: NodeKind::Text(text.into()),
            parent: None,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    fn unlink(&mut self, child: NodeId) -> Option<NodeId> {
        let parent = self.nodes[child].parent.take()?;
        self.nodes[parent].children.retain(|&c| c != child);
        Some(parent)
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node_ref(child)?;
        if matches!(self.node(parent)?, NodeKind::Text(_)) {
            return Err(DomError::NotAnElement(parent));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Detached(child));
        }
        if let Some(old_parent) = self.unlink(child) {
            self.record_child_list(old_parent, Vec::new(), vec![child]);
        }
        self.link(parent, child);
        self.record_child_list(parent, vec![child], Vec::new());
        Ok(())
    }

    /// Detach a node from its parent.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        self.node_ref(id)?;
        match self.unlink(id) {
            Some(parent) => {
                self.record_child_list(parent, Vec::new(), vec![id]);
                Ok(())
            }
            None => Err(DomError::Detached(id)),
        }
    }

    /// Put `new` where `old` is; `old` ends up detached.
    pub fn replace_child(&mut self, old: NodeId, new: NodeId) -> Result<(), DomError> {
        self.node_ref(new)?;
        let parent = self.parent(old).ok_or(DomError::Detached(old))?;
        if let Some(prev) = self.unlink(new) {
            self.record_child_list(prev, Vec::new(), vec![new]);
        }
        // `parent` may have lost `new` above, so look the index up afterwards.
        let index = self.nodes[parent]
            .children
            .iter()
            .position(|&c| c == old)
            .ok_or(DomError::Detached(old))?;
        self.nodes[parent].children[index] = new;
        self.nodes[new].parent = Some(parent);
        self.nodes[old].parent = None;
        self.record_child_list(parent, vec![new], vec![old]);
        Ok(())
    }

    /// Remove every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) -> Result<(), DomError> {
        self.node_ref(id)?;
        let removed = std::mem::take(&mut self.nodes[id].children);
        for &child in &removed {
            self.nodes[child].parent = None;
        }
        if !removed.is_empty() {
            self.record_child_list(id, Vec::new(), removed);
        }
        Ok(())
    }

    /// Nodes below `id` in document order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        out
    }

    /// Every attached element in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(0)
            .into_iter()
            .filter(|&n| self.is_element(n))
            .collect()
    }

    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(0)
            .into_iter()
            .filter(|&n| self.tag(n).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(0)
            .into_iter()
            .find(|&n| self.element(n).is_ok_and(|el| el.id() == Some(id)))
    }

    /// Text leaves below `id` in document order.
    pub fn text_leaves(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.text(n).is_some())
            .collect()
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.text_leaves(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Whether a text node sits inside a script-like element.
    pub fn in_non_renderable(&self, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if self
                .tag(node)
                .is_some_and(|t| NON_RENDERABLE_TAGS.contains(&t))
            {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Rendered text: non-empty renderable leaves, trimmed, one per line.
    pub fn inner_text(&self, id: NodeId) -> String {
        self.text_leaves(id)
            .into_iter()
            .filter(|&n| !self.in_non_renderable(n))
            .filter_map(|n| self.text(n))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Merge adjacent text children and drop empty ones, recursively.
    pub fn normalize(&mut self, id: NodeId) -> Result<(), DomError> {
        self.node_ref(id)?;
        let children = self.nodes[id].children.clone();
        let mut kept: Vec<NodeId> = Vec::with_capacity(children.len());
        for child in children {
            let text = match &self.nodes[child].kind {
                NodeKind::Text(text) => Some(text.clone()),
                _ => None,
            };
            match text {
                Some(text) if text.is_empty() => {
                    self.nodes[child].parent = None;
                    continue;
                }
                Some(text) => {
                    if let Some(&last) = kept.last() {
                        if let NodeKind::Text(prev) = &mut self.nodes[last].kind {
                            prev.push_str(&text);
                            self.nodes[child].parent = None;
                            continue;
                        }
                    }
                }
                None => self.normalize(child)?,
            }
            kept.push(child);
        }
        self.nodes[id].children = kept;
        Ok(())
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<String> {
        let el = self.element(id).ok()?;
        if name == "style" {
            return (!el.style.is_empty()).then(|| el.style_text());
        }
        el.attr(name).map(str::to_string)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        let el = self.element_mut(id)?;
        if name == "style" {
            el.parse_style(value);
        } else {
            el.set_attr(&name, value);
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<bool, DomError> {
        let el = self.element_mut(id)?;
        if name == "style" {
            let had = !el.style.is_empty();
            el.style.clear();
            return Ok(had);
        }
        Ok(el.remove_attr(name))
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<String> {
        self.element(id)
            .ok()
            .and_then(|el| el.style(property))
            .map(str::to_string)
    }

    /// Set an inline style property; an empty value removes it.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?.set_style(property, value);
        Ok(())
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let el = self.element_mut(id)?;
        if el.has_class(class) {
            return Ok(());
        }
        let joined = match el.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        el.set_attr("class", &joined);
        Ok(())
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let el = self.element_mut(id)?;
        let remaining: Vec<String> = el
            .classes()
            .filter(|c| *c != class)
            .map(str::to_string)
            .collect();
        el.set_attr("class", &remaining.join(" "));
        Ok(())
    }

    /// Add or remove `class` depending on `on`.
    pub fn toggle_class(&mut self, id: NodeId, class: &str, on: bool) -> Result<(), DomError> {
        if on {
            self.add_class(id, class)
        } else {
            self.remove_class(id, class)
        }
    }

    /// Current value of a form control.
    pub fn value(&self, id: NodeId) -> Result<String, DomError> {
        let el = self.element(id)?;
        if !el.is_form_control() {
            return Err(DomError::NotAFormControl {
                tag: el.tag.clone(),
            });
        }
        if let Some(value) = &el.value {
            return Ok(value.clone());
        }
        Ok(match el.tag.as_str() {
            "textarea" => self.text_content(id),
            "select" => self
                .descendants(id)
                .into_iter()
                .filter(|&n| self.tag(n) == Some("option"))
                .find(|&n| self.element(n).is_ok_and(|o| o.attr("selected").is_some()))
                .or_else(|| {
                    self.descendants(id)
                        .into_iter()
                        .find(|&n| self.tag(n) == Some("option"))
                })
                .map(|o| {
                    self.get_attribute(o, "value")
                        .unwrap_or_else(|| self.text_content(o))
                })
                .unwrap_or_default(),
            _ => el.attr("value").unwrap_or("").to_string(),
        })
    }

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) -> Result<(), DomError> {
        let el = self.element_mut(id)?;
        if !el.is_form_control() {
            return Err(DomError::NotAFormControl {
                tag: el.tag.clone(),
            });
        }
        el.value = Some(value.into());
        Ok(())
    }

    /// Nearest inclusive ancestor with the given tag.
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.tag(node).is_some_and(|t| t.eq_ignore_ascii_case(tag)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&c| c == id)?;
        siblings[..index]
            .iter()
            .rev()
            .copied()
            .find(|&s| self.is_element(s))
    }

    /// Bring an element into view.
    pub fn scroll_into_view(&mut self, id: NodeId) -> Result<(), DomError> {
        self.element(id)?;
        if !self.is_attached(id) {
            return Err(DomError::Detached(id));
        }
        self.scrolled_to = Some(id);
        Ok(())
    }

    /// Element most recently scrolled into view.
    pub fn scrolled_to(&self) -> Option<NodeId> {
        self.scrolled_to
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("title", &self.title)
            .field("url", &self.url)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
