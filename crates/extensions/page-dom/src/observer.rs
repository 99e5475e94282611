//! Child-list mutation observers.

use std::collections::BTreeMap;

use pagehands_protocols::DomError;

use crate::document::{Document, NodeId};

pub type ObserverId = u64;

/// Most records queued per observer before the oldest are discarded.
pub const MAX_PENDING_RECORDS: usize = 512;

/// A child-list change under an observed node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

struct Observer {
    target: NodeId,
    subtree: bool,
    records: Vec<MutationRecord>,
    dropped: usize,
}

#[derive(Default)]
pub(crate) struct Observers {
    next: ObserverId,
    active: BTreeMap<ObserverId, Observer>,
}

impl Document {
    /// Start observing child-list changes of `target` (and its subtree).
    pub fn observe(&mut self, target: NodeId, subtree: bool) -> Result<ObserverId, DomError> {
        self.node(target)?;
        self.observers.next += 1;
        let id = self.observers.next;
        self.observers.active.insert(
            id,
            Observer {
                target,
                subtree,
                records: Vec::new(),
                dropped: 0,
            },
        );
        Ok(id)
    }

    /// Drain the records queued for an observer.
    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .active
            .get_mut(&id)
            .map(|o| std::mem::take(&mut o.records))
            .unwrap_or_default()
    }

    pub fn pending_records(&self, id: ObserverId) -> usize {
        self.observers
            .active
            .get(&id)
            .map_or(0, |o| o.records.len())
    }

    /// Records discarded for an observer because its queue was full.
    pub fn dropped_records(&self, id: ObserverId) -> usize {
        self.observers.active.get(&id).map_or(0, |o| o.dropped)
    }

    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        self.observers.active.remove(&id).is_some()
    }

    /// Number of connected observers.
    pub fn observer_count(&self) -> usize {
        self.observers.active.len()
    }

    pub(crate) fn record_child_list(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        if self.observers.active.is_empty() {
            return;
        }
        let interested: Vec<ObserverId> = self
            .observers
            .active
            .iter()
            .filter(|(_, o)| {
                o.target == target || (o.subtree && self.is_inclusive_ancestor(o.target, target))
            })
            .map(|(id, _)| *id)
            .collect();
        for id in interested {
            if let Some(observer) = self.observers.active.get_mut(&id) {
                if observer.records.len() >= MAX_PENDING_RECORDS {
                    observer.records.remove(0);
                    observer.dropped += 1;
                }
                observer.records.push(MutationRecord {
                    target,
                    added: added.clone(),
                    removed: removed.clone(),
                });
            }
        }
    }
}
