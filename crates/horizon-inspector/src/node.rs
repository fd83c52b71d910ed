//! Drawer node storage.
//!
//! A [`DrawerNode`] lives in the [`DrawerTree`](crate::DrawerTree) arena for as
//! long as it is active or pooled. Parents carry an extra [`ParentState`]
//! with their two member arrays and fold animation; leaves don't pay for it.

use horizon_inspector_core::{DrawerId, Generation, Rect};

use crate::fold::FoldAnimation;
use crate::kind::{DrawerKind, MemberLayout};
use crate::member::{MemberHandle, MemberKey, TypeHandle};
use crate::value::DrawerValue;

/// Where a drawer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Acquired (and possibly set up) but not yet attached.
    Detached,
    /// Attached to exactly one parent or the root list.
    Active,
    /// Waiting in its kind's free-list.
    Pooled,
}

/// Read access to a parent's members.
pub trait HasChildren {
    /// All constructed members, in order.
    fn members(&self) -> &[DrawerId];

    /// The ordered subset of [`members`](Self::members) currently eligible
    /// for display.
    fn visible_members(&self) -> &[DrawerId];

    /// How members are arranged.
    fn layout(&self) -> MemberLayout;

    /// Whether members have been constructed from the build list.
    fn is_built(&self) -> bool;

    /// The fold animation state.
    fn fold(&self) -> &FoldAnimation;
}

/// Selection flag, set only by navigation and explicit selection.
pub trait HasSelection {
    /// Whether this drawer holds keyboard focus.
    fn is_selected(&self) -> bool;
}

/// Reorder state of a collection.
pub trait IsReorderable {
    /// The member currently being dragged, if any.
    fn reordering_member(&self) -> Option<DrawerId>;
}

/// Member bookkeeping of a parent drawer.
#[derive(Debug, Clone)]
pub struct ParentState {
    pub(crate) layout: MemberLayout,
    pub(crate) members: Vec<DrawerId>,
    pub(crate) visible_members: Vec<DrawerId>,
    pub(crate) built: bool,
    pub(crate) build_list: Option<Vec<MemberHandle>>,
    pub(crate) fold: FoldAnimation,
    pub(crate) reordering: Option<DrawerId>,
}

impl ParentState {
    fn new(kind: DrawerKind) -> Self {
        Self {
            layout: kind.layout(),
            members: Vec::new(),
            visible_members: Vec::new(),
            built: false,
            build_list: None,
            fold: FoldAnimation::for_kind(kind),
            reordering: None,
        }
    }

    fn reset(&mut self, kind: DrawerKind) {
        self.members.clear();
        self.visible_members.clear();
        self.built = false;
        self.build_list = None;
        self.fold = FoldAnimation::for_kind(kind);
        self.reordering = None;
    }
}

impl HasChildren for ParentState {
    fn members(&self) -> &[DrawerId] {
        &self.members
    }

    fn visible_members(&self) -> &[DrawerId] {
        &self.visible_members
    }

    fn layout(&self) -> MemberLayout {
        self.layout
    }

    fn is_built(&self) -> bool {
        self.built
    }

    fn fold(&self) -> &FoldAnimation {
        &self.fold
    }
}

impl IsReorderable for ParentState {
    fn reordering_member(&self) -> Option<DrawerId> {
        self.reordering
    }
}

/// A node of the drawer tree.
#[derive(Debug, Clone)]
pub struct DrawerNode {
    pub(crate) kind: DrawerKind,
    pub(crate) generation: Generation,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) key: Option<MemberKey>,
    pub(crate) label: String,
    pub(crate) value: DrawerValue,
    pub(crate) type_handle: Option<TypeHandle>,
    pub(crate) read_only: bool,
    pub(crate) selected: bool,
    pub(crate) should_show: bool,
    /// Whether the drawer is currently in its parent's (or the root)
    /// visible list. Gates visibility events to real transitions.
    pub(crate) listed: bool,
    pub(crate) bounds: Rect,
    pub(crate) parent: Option<DrawerId>,
    pub(crate) parent_state: Option<ParentState>,
}

impl DrawerNode {
    pub(crate) fn new(kind: DrawerKind) -> Self {
        Self {
            kind,
            generation: Generation::FIRST,
            lifecycle: Lifecycle::Detached,
            key: None,
            label: String::new(),
            value: DrawerValue::None,
            type_handle: None,
            read_only: false,
            selected: false,
            should_show: true,
            listed: false,
            bounds: Rect::ZERO,
            parent: None,
            parent_state: kind.is_parent().then(|| ParentState::new(kind)),
        }
    }

    /// Reset every field to its default, keeping kind, generation and the
    /// member arrays' capacity.
    pub(crate) fn reset(&mut self) {
        self.key = None;
        self.label.clear();
        self.value = DrawerValue::None;
        self.type_handle = None;
        self.read_only = false;
        self.selected = false;
        self.should_show = true;
        self.listed = false;
        self.bounds = Rect::ZERO;
        self.parent = None;
        if let Some(state) = &mut self.parent_state {
            state.reset(self.kind);
        }
    }

    /// Copy identity and value from a build-list entry.
    pub(crate) fn apply_handle(&mut self, handle: &MemberHandle) {
        self.key = Some(handle.key.clone());
        self.label.clone_from(&handle.label);
        self.value = handle.value.clone();
        self.type_handle = handle.type_handle.clone();
        self.read_only = handle.read_only;
    }

    /// Reconstruct the build-list entry this drawer represents.
    pub fn to_member_handle(&self) -> MemberHandle {
        MemberHandle {
            key: self
                .key
                .clone()
                .unwrap_or_else(|| MemberKey::new(&self.label)),
            kind: self.kind,
            label: self.label.clone(),
            value: self.value.clone(),
            type_handle: self.type_handle.clone(),
            read_only: self.read_only,
        }
    }

    /// The concrete kind.
    pub fn kind(&self) -> DrawerKind {
        self.kind
    }

    /// The reuse counter, bumped every time the drawer returns to the pool.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Lifecycle stage.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Whether the drawer sits in the pool.
    pub fn is_pooled(&self) -> bool {
        self.lifecycle == Lifecycle::Pooled
    }

    /// Identity within the parent, if set up from a build list.
    pub fn key(&self) -> Option<&MemberKey> {
        self.key.as_ref()
    }

    /// Display name.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Cached value.
    pub fn value(&self) -> &DrawerValue {
        &self.value
    }

    /// Type whose members a parent shows.
    pub fn type_handle(&self) -> Option<&TypeHandle> {
        self.type_handle.as_ref()
    }

    /// Whether user edits are rejected.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Result of the last filter pass. `true` when no filter is active.
    pub fn should_show(&self) -> bool {
        self.should_show
    }

    /// Whether the drawer is currently listed among its parent's visible
    /// members (or the visible roots).
    pub fn is_listed(&self) -> bool {
        self.listed
    }

    /// Last drawn rectangle.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The containing parent; `None` for roots and detached drawers.
    pub fn parent(&self) -> Option<DrawerId> {
        self.parent
    }

    /// Parent capabilities, for drawers that own members.
    pub fn as_parent(&self) -> Option<&ParentState> {
        self.parent_state.as_ref()
    }

    /// Reorder capabilities, for collections.
    pub fn as_reorderable(&self) -> Option<&dyn IsReorderable> {
        if self.kind.is_reorderable() {
            self.parent_state.as_ref().map(|state| state as &dyn IsReorderable)
        } else {
            None
        }
    }

    pub(crate) fn parent_state_mut(&mut self) -> Option<&mut ParentState> {
        self.parent_state.as_mut()
    }
}

impl HasSelection for DrawerNode {
    fn is_selected(&self) -> bool {
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_has_no_parent_state() {
        let node = DrawerNode::new(DrawerKind::Bool);
        assert!(node.as_parent().is_none());
        assert!(node.as_reorderable().is_none());
        assert_eq!(node.lifecycle(), Lifecycle::Detached);
        assert!(node.should_show());
    }

    #[test]
    fn test_capabilities_follow_kind() {
        let composite = DrawerNode::new(DrawerKind::Composite);
        assert!(composite.as_parent().is_some());
        assert!(composite.as_reorderable().is_none());

        let collection = DrawerNode::new(DrawerKind::Collection);
        let reorderable = collection.as_reorderable().unwrap();
        assert_eq!(reorderable.reordering_member(), None);
    }

    #[test]
    fn test_inline_starts_unfolded() {
        let node = DrawerNode::new(DrawerKind::Inline);
        let state = node.as_parent().unwrap();
        assert_eq!(state.layout(), MemberLayout::Horizontal);
        assert!(state.fold().target());
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut node = DrawerNode::new(DrawerKind::Composite);
        node.apply_handle(&MemberHandle::new("Transform", DrawerKind::Composite).with_type("Transform"));
        let state = node.parent_state_mut().unwrap();
        state.members.reserve(16);
        state.built = true;
        let capacity = state.members.capacity();

        node.reset();
        assert_eq!(node.label(), "");
        assert!(node.type_handle().is_none());
        let state = node.as_parent().unwrap();
        assert!(!state.is_built());
        assert!(state.members().is_empty());
        assert_eq!(state.members.capacity(), capacity);
    }

    #[test]
    fn test_member_handle_round_trip() {
        let handle = MemberHandle::new("Speed", DrawerKind::Float)
            .with_key("speed")
            .with_value(2.5)
            .read_only();
        let mut node = DrawerNode::new(DrawerKind::Float);
        node.apply_handle(&handle);
        assert_eq!(node.to_member_handle(), handle);
    }
}
