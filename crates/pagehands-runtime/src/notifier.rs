//! Notifier implementations.

use parking_lot::Mutex;
use tracing::{info, warn};

use pagehands_protocols::{NoticeLevel, Notifier};

/// Renders notices as log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, message: &str, level: NoticeLevel) {
        match level {
            NoticeLevel::Info => info!(target: "pagehands::notice", "{}", message),
            NoticeLevel::Success => info!(target: "pagehands::notice", "✓ {}", message),
            NoticeLevel::Error => warn!(target: "pagehands::notice", "{}", message),
        }
    }
}

/// A notice kept by [`MemoryNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

/// Keeps every notice in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().last().cloned()
    }
}

impl Notifier for MemoryNotifier {
    fn show(&self, message: &str, level: NoticeLevel) {
        self.notices.lock().push(Notice {
            message: message.to_string(),
            level,
        });
    }
}
