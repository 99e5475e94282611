//! Context addressing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextKind {
    /// Privileged background coordinator (one per extension).
    Coordinator,
    /// Page-attached mediator (one per document).
    Mediator,
    /// Capability host running inside the page's own script environment.
    PageHost,
    /// Popup surface.
    Popup,
    /// Options surface.
    Options,
}

impl ContextKind {
    /// Whether contexts of this kind are bound to a single document.
    pub fn is_per_document(&self) -> bool {
        matches!(self, ContextKind::Mediator | ContextKind::PageHost)
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContextKind::Coordinator => "coordinator",
            ContextKind::Mediator => "mediator",
            ContextKind::PageHost => "page-host",
            ContextKind::Popup => "popup",
            ContextKind::Options => "options",
        };
        f.write_str(name)
    }
}

/// Address of a context on the messaging fabric.
///
/// Per-document contexts carry the tab they are attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextAddress {
    pub kind: ContextKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab: Option<u32>,
}

impl ContextAddress {
    pub const fn coordinator() -> Self {
        Self {
            kind: ContextKind::Coordinator,
            tab: None,
        }
    }

    pub const fn popup() -> Self {
        Self {
            kind: ContextKind::Popup,
            tab: None,
        }
    }

    pub const fn options() -> Self {
        Self {
            kind: ContextKind::Options,
            tab: None,
        }
    }

    pub const fn mediator(tab: u32) -> Self {
        Self {
            kind: ContextKind::Mediator,
            tab: Some(tab),
        }
    }

    pub const fn page_host(tab: u32) -> Self {
        Self {
            kind: ContextKind::PageHost,
            tab: Some(tab),
        }
    }
}

impl fmt::Display for ContextAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tab {
            Some(tab) => write!(f, "{}#{}", self.kind, tab),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ContextAddress::coordinator().to_string(), "coordinator");
        assert_eq!(ContextAddress::mediator(7).to_string(), "mediator#7");
        assert_eq!(ContextAddress::page_host(2).to_string(), "page-host#2");
    }

    #[test]
    fn test_per_document() {
        assert!(ContextKind::Mediator.is_per_document());
        assert!(ContextKind::PageHost.is_per_document());
        assert!(!ContextKind::Popup.is_per_document());
    }

    #[test]
    fn test_serialize_skips_missing_tab() {
        let json = serde_json::to_string(&ContextAddress::popup()).unwrap();
        assert_eq!(json, r#"{"kind":"popup"}"#);

        let json = serde_json::to_string(&ContextAddress::page_host(3)).unwrap();
        assert_eq!(json, r#"{"kind":"pageHost","tab":3}"#);
    }
}
