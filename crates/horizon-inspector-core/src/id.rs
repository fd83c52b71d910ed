//! Drawer identity.
//!
//! A drawer keeps the same [`DrawerId`] for as long as it lives in the arena,
//! including the time it spends in the pool between uses. Every return to the
//! pool bumps its [`Generation`], so a [`DrawerHandle`] captured before the
//! drawer was recycled no longer matches the live drawer.

use slotmap::{new_key_type, Key};
use static_assertions::assert_impl_all;

new_key_type! {
    /// A unique identifier for a drawer in the arena.
    ///
    /// `DrawerId`s are stable for the pooled lifetime of a drawer: a drawer
    /// returned to its pool and later reused keeps its id. Use a
    /// [`DrawerHandle`] when a reference must also detect reuse.
    pub struct DrawerId;
}

impl DrawerId {
    /// Convert the DrawerId to a raw u64 value.
    ///
    /// The raw value can be converted back using [`DrawerId::from_raw`].
    #[inline]
    pub fn as_raw(self) -> u64 {
        self.data().as_ffi()
    }

    /// Create a DrawerId from a raw u64 value.
    ///
    /// This does not check that the id exists in any arena.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Reuse counter of a pooled drawer.
///
/// Starts at zero for a freshly allocated drawer and increases by one every
/// time the drawer is returned to its pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u32);

impl Generation {
    /// The generation of a freshly allocated drawer.
    pub const FIRST: Self = Self(0);

    /// Get the raw counter value.
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// The generation following this one.
    #[inline]
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A drawer id paired with the generation it was observed at.
///
/// Long-lived callbacks hold a handle instead of a bare id. When the callback
/// fires it asks the tree to resolve the handle; a recycled drawer no longer
/// resolves and the callback drops its effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawerHandle {
    id: DrawerId,
    generation: Generation,
}

impl DrawerHandle {
    /// Create a handle for `id` at `generation`.
    #[inline]
    pub fn new(id: DrawerId, generation: Generation) -> Self {
        Self { id, generation }
    }

    /// The drawer id.
    #[inline]
    pub fn id(self) -> DrawerId {
        self.id
    }

    /// The generation the handle was taken at.
    #[inline]
    pub fn generation(self) -> Generation {
        self.generation
    }
}

assert_impl_all!(DrawerId: Copy, Send, Sync);
assert_impl_all!(DrawerHandle: Copy, Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_raw_round_trip() {
        let mut map: SlotMap<DrawerId, ()> = SlotMap::with_key();
        let id = map.insert(());
        assert_eq!(DrawerId::from_raw(id.as_raw()), id);
    }

    #[test]
    fn test_generation_advances() {
        let first = Generation::FIRST;
        assert_eq!(first.get(), 0);
        assert!(first.next() > first);
        assert_eq!(first.next().next().get(), 2);
    }

    #[test]
    fn test_handle_equality_tracks_generation() {
        let mut map: SlotMap<DrawerId, ()> = SlotMap::with_key();
        let id = map.insert(());
        let old = DrawerHandle::new(id, Generation::FIRST);
        let new = DrawerHandle::new(id, Generation::FIRST.next());
        assert_eq!(old.id(), new.id());
        assert_ne!(old, new);
    }
}
