//! Per-kind free-lists of recycled drawers.
//!
//! The pool never owns drawer storage. A released drawer stays in its arena
//! slot (keeping its [`DrawerId`]) and the pool records the id in the free-list
//! for its concrete kind. `take` hands such an id back for reuse; when the
//! free-list is empty the caller allocates a fresh drawer and reports it with
//! [`NodePool::note_allocation`].
//!
//! Pool access is single-threaded, so there is no locking.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::error::{DrawerError, InspectorResult};
use crate::id::DrawerId;
use crate::logging::targets;

/// Counters for a single kind's free-list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Drawers allocated fresh because the free-list was empty.
    pub allocated: usize,
    /// Drawers handed out from the free-list.
    pub reused: usize,
    /// Drawers returned to the free-list.
    pub released: usize,
    /// Drawers dropped because the free-list was full.
    pub discarded: usize,
    /// Drawers currently waiting in the free-list.
    pub free: usize,
}

/// What the pool did with a released drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// The drawer is now in the free-list and keeps its arena slot.
    Pooled,
    /// The free-list is at capacity; the caller should remove the drawer
    /// from its arena.
    Discard,
}

/// Free-lists of drawer ids keyed by concrete drawer kind.
pub struct NodePool<K> {
    free: HashMap<K, Vec<DrawerId>>,
    pooled: HashSet<DrawerId>,
    stats: HashMap<K, PoolStats>,
    max_free_per_kind: Option<usize>,
}

impl<K> fmt::Debug for NodePool<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodePool")
            .field("pooled", &self.pooled.len())
            .field("max_free_per_kind", &self.max_free_per_kind)
            .finish()
    }
}

impl<K: Copy + Eq + Hash + fmt::Debug> Default for NodePool<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash + fmt::Debug> NodePool<K> {
    /// Create an unbounded pool.
    pub fn new() -> Self {
        Self {
            free: HashMap::new(),
            pooled: HashSet::new(),
            stats: HashMap::new(),
            max_free_per_kind: None,
        }
    }

    /// Create a pool whose free-lists hold at most `max` drawers per kind.
    pub fn with_limit(max_free_per_kind: Option<usize>) -> Self {
        Self {
            max_free_per_kind,
            ..Self::new()
        }
    }

    /// Take a recycled drawer of `kind`, if one is waiting.
    pub fn take(&mut self, kind: K) -> Option<DrawerId> {
        let id = self.free.get_mut(&kind)?.pop()?;
        self.pooled.remove(&id);
        let stats = self.stats.entry(kind).or_default();
        stats.reused += 1;
        stats.free -= 1;
        tracing::trace!(target: targets::POOL, ?kind, ?id, "reusing pooled drawer");
        Some(id)
    }

    /// Record that a drawer of `kind` was freshly allocated.
    pub fn note_allocation(&mut self, kind: K) {
        self.stats.entry(kind).or_default().allocated += 1;
    }

    /// Return a drawer to the free-list for `kind`.
    ///
    /// Releasing a drawer that is already pooled is a structural violation.
    pub fn release(&mut self, kind: K, id: DrawerId) -> InspectorResult<Release> {
        if self.pooled.contains(&id) {
            return Err(DrawerError::DoubleRelease(id).structural());
        }

        let list = self.free.entry(kind).or_default();
        let stats = self.stats.entry(kind).or_default();
        if self.max_free_per_kind.is_some_and(|max| list.len() >= max) {
            stats.discarded += 1;
            tracing::trace!(target: targets::POOL, ?kind, ?id, "free-list full, discarding drawer");
            return Ok(Release::Discard);
        }

        list.push(id);
        self.pooled.insert(id);
        stats.released += 1;
        stats.free += 1;
        tracing::trace!(target: targets::POOL, ?kind, ?id, "released drawer to pool");
        Ok(Release::Pooled)
    }

    /// Whether `id` is currently waiting in a free-list.
    pub fn is_pooled(&self, id: DrawerId) -> bool {
        self.pooled.contains(&id)
    }

    /// Number of drawers of `kind` waiting in the free-list.
    pub fn free_count(&self, kind: K) -> usize {
        self.free.get(&kind).map_or(0, Vec::len)
    }

    /// Total number of pooled drawers across all kinds.
    pub fn total_free(&self) -> usize {
        self.pooled.len()
    }

    /// Counters for `kind`.
    pub fn stats(&self, kind: K) -> PoolStats {
        self.stats.get(&kind).copied().unwrap_or_default()
    }

    /// Empty every free-list, returning the ids that were pooled.
    ///
    /// The caller is responsible for removing them from its arena.
    pub fn drain(&mut self) -> Vec<DrawerId> {
        self.pooled.clear();
        for stats in self.stats.values_mut() {
            stats.free = 0;
        }
        self.free.drain().flat_map(|(_, ids)| ids).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Leaf,
        Parent,
    }

    fn ids(n: usize) -> Vec<DrawerId> {
        let mut map: SlotMap<DrawerId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_take_from_empty_pool() {
        let mut pool = NodePool::<Kind>::new();
        assert_eq!(pool.take(Kind::Leaf), None);
    }

    #[test]
    fn test_release_then_take_same_kind() {
        let ids = ids(2);
        let mut pool = NodePool::new();
        assert_eq!(pool.release(Kind::Leaf, ids[0]).unwrap(), Release::Pooled);
        assert_eq!(pool.release(Kind::Parent, ids[1]).unwrap(), Release::Pooled);

        assert!(pool.is_pooled(ids[0]));
        assert_eq!(pool.take(Kind::Leaf), Some(ids[0]));
        assert!(!pool.is_pooled(ids[0]));
        assert_eq!(pool.take(Kind::Leaf), None);
        assert_eq!(pool.free_count(Kind::Parent), 1);
    }

    #[test]
    fn test_stats() {
        let ids = ids(1);
        let mut pool = NodePool::new();
        pool.note_allocation(Kind::Leaf);
        pool.release(Kind::Leaf, ids[0]).unwrap();
        pool.take(Kind::Leaf);

        let stats = pool.stats(Kind::Leaf);
        assert_eq!(stats.allocated, 1);
        assert_eq!(stats.released, 1);
        assert_eq!(stats.reused, 1);
        assert_eq!(stats.free, 0);
    }

    #[test]
    fn test_limit_discards() {
        let ids = ids(3);
        let mut pool = NodePool::with_limit(Some(2));
        assert_eq!(pool.release(Kind::Leaf, ids[0]).unwrap(), Release::Pooled);
        assert_eq!(pool.release(Kind::Leaf, ids[1]).unwrap(), Release::Pooled);
        assert_eq!(pool.release(Kind::Leaf, ids[2]).unwrap(), Release::Discard);
        assert!(!pool.is_pooled(ids[2]));
        assert_eq!(pool.stats(Kind::Leaf).discarded, 1);
    }

    #[test]
    fn test_drain() {
        let ids = ids(2);
        let mut pool = NodePool::new();
        pool.release(Kind::Leaf, ids[0]).unwrap();
        pool.release(Kind::Parent, ids[1]).unwrap();

        let mut drained = pool.drain();
        drained.sort();
        let mut expected = ids.clone();
        expected.sort();
        assert_eq!(drained, expected);
        assert_eq!(pool.total_free(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "released to the pool twice")]
    fn test_double_release_panics_in_debug() {
        let ids = ids(1);
        let mut pool = NodePool::new();
        pool.release(Kind::Leaf, ids[0]).unwrap();
        let _ = pool.release(Kind::Leaf, ids[0]);
    }
}
