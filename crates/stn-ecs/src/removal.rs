//! Deferred entity removal.
//!
//! Logic running inside a tick never removes entities directly. It marks them
//! on the [`RemovalQueue`], which the manager drains in FIFO order once every
//! entity has been updated. Until then a marked entity stays in the live set
//! and is visible to every query, so the outcome of a tick does not depend on
//! which entity happened to update first.

use std::collections::BTreeSet;

use crate::entity::EntityId;

// ---------------------------------------------------------------------------
// FlushReport
// ---------------------------------------------------------------------------

/// Summary of the last flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Entities actually removed from the live set.
    pub removed: usize,
    /// Queued ids that were already gone (removed administratively mid-tick).
    pub missing: usize,
}

// ---------------------------------------------------------------------------
// RemovalQueue
// ---------------------------------------------------------------------------

/// FIFO queue of pending removals. Marking is idempotent.
#[derive(Debug, Default)]
pub struct RemovalQueue {
    order: Vec<EntityId>,
    marked: BTreeSet<EntityId>,
}

impl RemovalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `id`. Returns `false` if it was already queued.
    pub fn mark(&mut self, id: EntityId) -> bool {
        if !self.marked.insert(id) {
            return false;
        }
        self.order.push(id);
        true
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.marked.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Take every pending id in marking order, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<EntityId> {
        self.marked.clear();
        std::mem::take(&mut self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marking_twice_is_a_noop() {
        let mut q = RemovalQueue::new();
        let id = EntityId::from_raw(1);
        assert!(q.mark(id));
        assert!(!q.mark(id));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn drain_preserves_marking_order() {
        let mut q = RemovalQueue::new();
        for raw in [5, 2, 9] {
            q.mark(EntityId::from_raw(raw));
        }
        let drained: Vec<u64> = q.drain().into_iter().map(EntityId::to_raw).collect();
        assert_eq!(drained, vec![5, 2, 9]);
        assert!(q.is_empty());
        assert!(!q.contains(EntityId::from_raw(5)));
    }
}
