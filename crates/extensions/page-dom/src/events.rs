//! Bubbling events.

use std::sync::Arc;

use pagehands_protocols::DomError;

use crate::document::{Document, NodeId};

/// Most dispatched events kept in the log; older entries are dropped first.
pub const EVENT_LOG_CAPACITY: usize = 256;

/// Identifies a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// An event as seen by a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_type: String,
    pub target: NodeId,
    pub current_target: NodeId,
    pub bubbles: bool,
}

/// Record of a dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedEvent {
    pub event_type: String,
    pub target: NodeId,
    pub bubbles: bool,
}

type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

pub(crate) struct ListenerEntry {
    id: ListenerId,
    target: NodeId,
    event_type: String,
    callback: Listener,
}

impl Document {
    pub fn add_event_listener(
        &mut self,
        target: NodeId,
        event_type: &str,
        callback: impl Fn(&Event) + Send + Sync + 'static,
    ) -> Result<ListenerId, DomError> {
        self.node(target)?;
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push(ListenerEntry {
            id,
            target,
            event_type: event_type.to_string(),
            callback: Arc::new(callback),
        });
        Ok(id)
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        before != self.listeners.len()
    }

    /// Dispatch an event at `target`, walking up the ancestors when it bubbles.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch_event(
        &mut self,
        target: NodeId,
        event_type: &str,
        bubbles: bool,
    ) -> Result<usize, DomError> {
        self.node(target)?;
        if self.events.len() >= EVENT_LOG_CAPACITY {
            let excess = self.events.len() + 1 - EVENT_LOG_CAPACITY;
            self.events.drain(..excess);
        }
        self.events.push(DispatchedEvent {
            event_type: event_type.to_string(),
            target,
            bubbles,
        });

        let mut path = vec![target];
        if bubbles {
            let mut current = self.parent(target);
            while let Some(node) = current {
                path.push(node);
                current = self.parent(node);
            }
        }

        let mut invoked = 0;
        for current_target in path {
            let callbacks: Vec<Listener> = self
                .listeners
                .iter()
                .filter(|l| l.target == current_target && l.event_type == event_type)
                .map(|l| l.callback.clone())
                .collect();
            let event = Event {
                event_type: event_type.to_string(),
                target,
                current_target,
                bubbles,
            };
            for callback in callbacks {
                callback(&event);
                invoked += 1;
            }
        }
        Ok(invoked)
    }

    /// The most recent dispatched events, oldest first.
    pub fn dispatched_events(&self) -> &[DispatchedEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_event_bubbles_to_ancestors() {
        let mut doc = Document::new("t", "https://example.com/");
        let form = doc.create_element("form");
        let input = doc.create_element("input");
        doc.append_child(doc.body(), form).unwrap();
        doc.append_child(form, input).unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        doc.add_event_listener(form, "input", move |event| {
            assert_eq!(event.target, input);
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        assert_eq!(doc.dispatch_event(input, "input", true).unwrap(), 1);
        assert_eq!(doc.dispatch_event(input, "input", false).unwrap(), 0);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(doc.dispatched_events().len(), 2);
    }

    #[test]
    fn test_remove_listener() {
        let mut doc = Document::new("t", "");
        let body = doc.body();
        let id = doc.add_event_listener(body, "change", |_| {}).unwrap();
        assert!(doc.remove_event_listener(id));
        assert!(!doc.remove_event_listener(id));
        assert_eq!(doc.dispatch_event(body, "change", true).unwrap(), 0);
    }

    #[test]
    fn test_event_log_keeps_latest() {
        let mut doc = Document::new("t", "");
        let body = doc.body();
        for _ in 0..EVENT_LOG_CAPACITY {
            doc.dispatch_event(body, "input", false).unwrap();
        }
        doc.dispatch_event(body, "change", false).unwrap();

        let events = doc.dispatched_events();
        assert_eq!(events.len(), EVENT_LOG_CAPACITY);
        assert_eq!(events.last().unwrap().event_type, "change");
        assert_eq!(events.iter().filter(|e| e.event_type == "input").count(), EVENT_LOG_CAPACITY - 1);
    }

    #[test]
    fn test_dispatch_unknown_node() {
        let mut doc = Document::new("t", "");
        assert!(doc.dispatch_event(999, "click", true).is_err());
    }
}
