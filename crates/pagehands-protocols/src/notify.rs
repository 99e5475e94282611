//! Notification rendering collaborator.

use serde::{Deserialize, Serialize};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    #[default]
    Info,
    Success,
    Error,
}

/// Shows short status messages to the user.
pub trait Notifier: Send + Sync {
    fn show(&self, message: &str, level: NoticeLevel);
}
