use std::collections::{HashMap, HashSet, VecDeque};

use crate::board::StateKey;

use super::node::NodeId;

#[derive(Clone, Copy)]
struct OpenEntry {
    f: u32,
    id: NodeId,
}

/// The open set: nodes discovered but not yet expanded, ordered ascending
/// by f with FIFO ties, plus a key index for membership tests.
///
/// Insertion lands *after* existing equal-f entries (binary search via
/// `partition_point`), so equal-priority nodes pop in insertion order.
/// When a cheaper path improves an open node's f, [`Frontier::reposition`]
/// moves its entry to the slot the new f dictates instead of leaving it
/// stale.
#[derive(Default)]
pub(super) struct Frontier {
    order: VecDeque<OpenEntry>,
    open: HashMap<StateKey, NodeId, ahash::RandomState>,
}

impl Frontier {
    /// Insert an open node with priority `f`.
    pub fn insert(&mut self, key: StateKey, id: NodeId, f: u32) {
        let at = self.order.partition_point(|e| e.f <= f);
        self.order.insert(at, OpenEntry { f, id });
        self.open.insert(key, id);
    }

    /// Remove and return the minimum-f node, FIFO among ties.
    ///
    /// The caller must follow up with [`Frontier::take_open`] to retire the
    /// node's key from the open index.
    pub fn pop_min(&mut self) -> Option<NodeId> {
        self.order.pop_front().map(|e| e.id)
    }

    /// Remove a key from the open index, returning the owned key and the
    /// node it mapped to.
    pub fn take_open(&mut self, key: &[u8]) -> Option<(StateKey, NodeId)> {
        self.open.remove_entry(key)
    }

    /// Node currently open under `key`, if any.
    pub fn get_open(&self, key: &[u8]) -> Option<NodeId> {
        self.open.get(key).copied()
    }

    /// Move an open node from its slot at `old_f` to the slot `new_f`
    /// dictates, keeping the order sorted after a decrease-key.
    ///
    /// The repositioned entry is treated as a fresh insertion among its new
    /// equal-f peers.
    pub fn reposition(&mut self, id: NodeId, old_f: u32, new_f: u32) {
        let start = self.order.partition_point(|e| e.f < old_f);
        let end = self.order.partition_point(|e| e.f <= old_f);
        let at = (start..end)
            .find(|&i| self.order[i].id == id)
            .expect("open node missing from the order at its recorded f");
        self.order
            .remove(at)
            .expect("frontier order entry vanished during reposition");
        let to = self.order.partition_point(|e| e.f <= new_f);
        self.order.insert(to, OpenEntry { f: new_f, id });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }
}

/// The closed set: canonical keys already expanded.
///
/// Append-only; once a key is closed it is never removed or reopened, which
/// is sound for a consistent heuristic.
#[derive(Default)]
pub(super) struct ClosedSet {
    keys: HashSet<StateKey, ahash::RandomState>,
}

impl ClosedSet {
    #[inline]
    pub fn contains(&self, key: &[u8]) -> bool {
        self.keys.contains(key)
    }

    /// Idempotent.
    #[inline]
    pub fn insert(&mut self, key: StateKey) {
        self.keys.insert(key);
    }
}
