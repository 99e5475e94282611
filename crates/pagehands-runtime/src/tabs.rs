//! Tab registry kept by the coordinator.

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the coordinator knows about one tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub tab: u32,
    pub url: String,
    pub title: String,
    /// Milliseconds since the epoch when the mediator reported ready.
    pub ready_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_action: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_extract: Option<Value>,
}

/// Tabs with a ready mediator, plus the active tab.
#[derive(Debug, Default)]
pub struct TabRegistry {
    tabs: DashMap<u32, TabInfo>,
    active: Mutex<Option<u32>>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a ready tab and make it active.
    pub fn ready(&self, tab: u32, url: impl Into<String>, title: impl Into<String>) {
        let info = TabInfo {
            tab,
            url: url.into(),
            title: title.into(),
            ready_at: chrono::Utc::now().timestamp_millis(),
            last_action: None,
            last_extract: None,
        };
        self.tabs.insert(tab, info);
        *self.active.lock() = Some(tab);
    }

    pub fn remove(&self, tab: u32) -> Option<TabInfo> {
        let removed = self.tabs.remove(&tab).map(|(_, info)| info);
        let mut active = self.active.lock();
        if *active == Some(tab) {
            *active = self.tabs.iter().map(|entry| *entry.key()).max();
        }
        removed
    }

    pub fn get(&self, tab: u32) -> Option<TabInfo> {
        self.tabs.get(&tab).map(|entry| entry.clone())
    }

    pub fn contains(&self, tab: u32) -> bool {
        self.tabs.contains_key(&tab)
    }

    /// All tabs ordered by id.
    pub fn list(&self) -> Vec<TabInfo> {
        let mut tabs: Vec<TabInfo> = self.tabs.iter().map(|entry| entry.clone()).collect();
        tabs.sort_by_key(|t| t.tab);
        tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active(&self) -> Option<u32> {
        *self.active.lock()
    }

    /// Make a known tab active. Returns false for unknown tabs.
    pub fn activate(&self, tab: u32) -> bool {
        if !self.tabs.contains_key(&tab) {
            return false;
        }
        *self.active.lock() = Some(tab);
        true
    }

    pub fn record_action(&self, tab: u32, report: Value) {
        if let Some(mut info) = self.tabs.get_mut(&tab) {
            info.last_action = Some(report);
        }
    }

    pub fn record_extract(&self, tab: u32, data: Value) {
        if let Some(mut info) = self.tabs.get_mut(&tab) {
            info.last_extract = Some(data);
        }
    }

    /// Forget every recorded action report and extraction.
    pub fn clear_records(&self) {
        for mut entry in self.tabs.iter_mut() {
            entry.last_action = None;
            entry.last_extract = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ready_sets_active() {
        let tabs = TabRegistry::new();
        tabs.ready(1, "https://a.example/", "A");
        tabs.ready(2, "https://b.example/", "B");
        assert_eq!(tabs.active(), Some(2));
        assert!(tabs.activate(1));
        assert_eq!(tabs.active(), Some(1));
        assert!(!tabs.activate(9));
    }

    #[test]
    fn test_remove_active_falls_back() {
        let tabs = TabRegistry::new();
        tabs.ready(1, "", "");
        tabs.ready(3, "", "");
        tabs.ready(2, "", "");
        tabs.remove(2);
        assert_eq!(tabs.active(), Some(3));
        tabs.remove(3);
        tabs.remove(1);
        assert_eq!(tabs.active(), None);
        assert!(tabs.is_empty());
    }

    #[test]
    fn test_records_and_listing() {
        let tabs = TabRegistry::new();
        tabs.ready(5, "u5", "t5");
        tabs.ready(4, "u4", "t4");
        tabs.record_action(5, json!({"elements": 3}));
        tabs.record_extract(9, json!({}));

        let list = tabs.list();
        assert_eq!(list.iter().map(|t| t.tab).collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(list[1].last_action, Some(json!({"elements": 3})));
        let json = serde_json::to_value(&list[0]).unwrap();
        assert!(json.get("lastAction").is_none());
        assert!(json["readyAt"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_clear_records_keeps_tabs() {
        let tabs = TabRegistry::new();
        tabs.ready(1, "u1", "t1");
        tabs.record_action(1, json!({"elements": 1}));
        tabs.record_extract(1, json!({"title": "t1"}));

        tabs.clear_records();
        let info = tabs.get(1).unwrap();
        assert!(info.last_action.is_none());
        assert!(info.last_extract.is_none());
        assert_eq!(tabs.active(), Some(1));
    }
}
