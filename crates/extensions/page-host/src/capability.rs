//! Capability names.

use std::fmt;
use std::str::FromStr;

use pagehands_protocols::CapabilityError;

/// Router action prefix for capability calls.
pub const ACTION_PREFIX: &str = "capability:";

/// Every operation the page host exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    HighlightText,
    RemoveHighlight,
    ExtractPageData,
    AnalyzePage,
    FindAndReplace,
    AddCustomStyles,
    RemoveCustomStyles,
    GetPageStats,
    ScrollToElement,
    HighlightElement,
}

impl Capability {
    pub const ALL: [Capability; 10] = [
        Capability::HighlightText,
        Capability::RemoveHighlight,
        Capability::ExtractPageData,
        Capability::AnalyzePage,
        Capability::FindAndReplace,
        Capability::AddCustomStyles,
        Capability::RemoveCustomStyles,
        Capability::GetPageStats,
        Capability::ScrollToElement,
        Capability::HighlightElement,
    ];

    /// Wire name.
    pub fn name(&self) -> &'static str {
        match self {
            Capability::HighlightText => "highlightText",
            Capability::RemoveHighlight => "removeHighlight",
            Capability::ExtractPageData => "extractPageData",
            Capability::AnalyzePage => "analyzePage",
            Capability::FindAndReplace => "findAndReplace",
            Capability::AddCustomStyles => "addCustomStyles",
            Capability::RemoveCustomStyles => "removeCustomStyles",
            Capability::GetPageStats => "getPageStats",
            Capability::ScrollToElement => "scrollToElement",
            Capability::HighlightElement => "highlightElement",
        }
    }

    /// Router action, e.g. `capability:highlightText`.
    pub fn action(&self) -> String {
        format!("{}{}", ACTION_PREFIX, self.name())
    }

    /// Parse a router action carrying the capability prefix.
    pub fn from_action(action: &str) -> Result<Self, CapabilityError> {
        action
            .strip_prefix(ACTION_PREFIX)
            .ok_or_else(|| CapabilityError::NotFound(action.to_string()))?
            .parse()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capability {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| CapabilityError::NotFound(s.to_string()))
    }
}
