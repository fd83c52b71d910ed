//! The drawer tree arena and drawer lifecycle.
//!
//! [`DrawerTree`] owns every drawer in a [`SlotMap`]. Ownership is strictly
//! parent to member: a parent's `members` array holds the ids it owns, and
//! each member's `parent` field is a plain id pointing back. Disposing a
//! drawer resets it, bumps its generation and files it in the pool for its
//! kind; the next [`acquire`](DrawerTree::acquire) of that kind hands the same
//! slot back.
//!
//! Member management, filtering, folding, navigation and reordering are
//! implemented in their own modules as further `impl DrawerTree` blocks.

use std::fmt;

use horizon_inspector_core::logging::targets;
use horizon_inspector_core::{
    DrawerError, DrawerHandle, DrawerId, InspectorResult, NodePool, Point, PoolStats, Rect,
    Release, Signal,
};
use slotmap::SlotMap;

use crate::config::InspectorConfig;
use crate::events::VisibilityEvent;
use crate::filter::ActiveFilter;
use crate::kind::{DrawerKind, MemberLayout};
use crate::member::{MemberHandle, MemberResolver, TypeHandle};
use crate::node::{DrawerNode, Lifecycle, ParentState};
use crate::value::DrawerValue;

/// The retained tree of drawers shown by one inspector.
///
/// All access happens on the UI thread; the tree is deliberately not `Sync`.
pub struct DrawerTree {
    pub(crate) nodes: SlotMap<DrawerId, DrawerNode>,
    pub(crate) pool: NodePool<DrawerKind>,
    pub(crate) roots: Vec<DrawerId>,
    pub(crate) visible_roots: Vec<DrawerId>,
    pub(crate) resolver: Box<dyn MemberResolver>,
    pub(crate) config: InspectorConfig,
    pub(crate) filter: Option<ActiveFilter>,
    /// Set while a filter pass runs. Structural changes made during the pass
    /// leave visible lists to the pass.
    pub(crate) filter_pass: bool,
    pub(crate) animating: Vec<DrawerHandle>,
    pub(crate) selection: Option<DrawerHandle>,
    pub(crate) preferred_column: usize,
    pub(crate) visibility_changed: Signal<VisibilityEvent>,
}

impl fmt::Debug for DrawerTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawerTree")
            .field("nodes", &self.nodes.len())
            .field("roots", &self.roots)
            .field("pooled", &self.pool.total_free())
            .field("filtering", &self.is_filtering())
            .field("animating", &self.animating.len())
            .finish_non_exhaustive()
    }
}

impl DrawerTree {
    /// Create a tree with the default configuration.
    pub fn new(resolver: impl MemberResolver + 'static) -> Self {
        Self::with_config(resolver, InspectorConfig::default())
    }

    /// Create a tree with an explicit configuration.
    pub fn with_config(resolver: impl MemberResolver + 'static, config: InspectorConfig) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            pool: NodePool::with_limit(config.pool.max_free_per_kind),
            roots: Vec::new(),
            visible_roots: Vec::new(),
            resolver: Box::new(resolver),
            config,
            filter: None,
            filter_pass: false,
            animating: Vec::new(),
            selection: None,
            preferred_column: 0,
            visibility_changed: Signal::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// The member resolver.
    pub fn resolver_mut(&mut self) -> &mut dyn MemberResolver {
        self.resolver.as_mut()
    }

    /// Fired when a drawer enters or leaves a visible list.
    pub fn visibility_changed(&self) -> &Signal<VisibilityEvent> {
        &self.visibility_changed
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Get a drawer, including pooled ones.
    pub fn node(&self, id: DrawerId) -> Option<&DrawerNode> {
        self.nodes.get(id)
    }

    /// Whether `id` names a drawer that is not pooled.
    pub fn contains(&self, id: DrawerId) -> bool {
        self.nodes.get(id).is_some_and(|node| !node.is_pooled())
    }

    /// Number of drawers that are not pooled.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.pool.total_free()
    }

    /// Whether the tree holds no drawers outside the pool.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capture a handle to `id` for later staleness checks.
    pub fn handle(&self, id: DrawerId) -> InspectorResult<DrawerHandle> {
        let node = self.active(id)?;
        Ok(DrawerHandle::new(id, node.generation))
    }

    /// Resolve a handle captured earlier.
    ///
    /// Returns `None` when the drawer was disposed since, whether or not its
    /// slot has been reused.
    pub fn resolve(&self, handle: DrawerHandle) -> Option<DrawerId> {
        let id = handle.id();
        match self.nodes.get(id) {
            Some(node) if !node.is_pooled() && node.generation == handle.generation() => Some(id),
            _ => {
                tracing::trace!(target: targets::TREE, ?handle, "dropping stale drawer handle");
                None
            }
        }
    }

    pub(crate) fn get(&self, id: DrawerId) -> InspectorResult<&DrawerNode> {
        self.nodes.get(id).ok_or(DrawerError::InvalidDrawerId(id))
    }

    /// Get a drawer that must not be pooled.
    pub(crate) fn active(&self, id: DrawerId) -> InspectorResult<&DrawerNode> {
        let node = self.get(id)?;
        if node.is_pooled() {
            return Err(DrawerError::Pooled(id).structural());
        }
        Ok(node)
    }

    pub(crate) fn active_mut(&mut self, id: DrawerId) -> InspectorResult<&mut DrawerNode> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or(DrawerError::InvalidDrawerId(id))?;
        if node.is_pooled() {
            return Err(DrawerError::Pooled(id).structural());
        }
        Ok(node)
    }

    pub(crate) fn parent_state(&self, id: DrawerId) -> InspectorResult<&ParentState> {
        self.active(id)?
            .as_parent()
            .ok_or(DrawerError::NotAParent(id))
    }

    pub(crate) fn parent_state_mut(&mut self, id: DrawerId) -> InspectorResult<&mut ParentState> {
        self.active_mut(id)?
            .parent_state_mut()
            .ok_or(DrawerError::NotAParent(id))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Get a drawer of `kind`, reusing a pooled one when available.
    ///
    /// The drawer is detached with default fields until [`setup`](Self::setup)
    /// and [`late_setup`](Self::late_setup) run.
    pub fn acquire(&mut self, kind: DrawerKind) -> DrawerId {
        if let Some(id) = self.pool.take(kind)
            && let Some(node) = self.nodes.get_mut(id)
        {
            node.lifecycle = Lifecycle::Detached;
            return id;
        }
        self.pool.note_allocation(kind);
        let id = self.nodes.insert(DrawerNode::new(kind));
        tracing::trace!(target: targets::POOL, ?id, %kind, "allocated drawer");
        id
    }

    /// First setup phase: assign identity, value and parent.
    ///
    /// The parent is recorded but the drawer is not yet listed in its
    /// members; that happens when the parent installs it.
    pub fn setup(
        &mut self,
        id: DrawerId,
        handle: &MemberHandle,
        parent: Option<DrawerId>,
    ) -> InspectorResult<()> {
        if let Some(parent) = parent {
            self.parent_state(parent)?;
        }
        let node = self.active_mut(id)?;
        if node.lifecycle != Lifecycle::Detached {
            return Err(DrawerError::AlreadyAttached(id).structural());
        }
        if handle.kind != node.kind || !node.kind.accepts(&handle.value) {
            return Err(DrawerError::ValueMismatch {
                id,
                kind: node.kind.name(),
            });
        }
        node.apply_handle(handle);
        node.parent = parent;
        tracing::trace!(target: targets::TREE, ?id, label = %handle.label, ?parent, "set up drawer");
        Ok(())
    }

    /// Second setup phase, run once the drawer sits in its parent's members
    /// (or the root list).
    ///
    /// Parents that start unfolded build their members here.
    pub fn late_setup(&mut self, id: DrawerId) -> InspectorResult<()> {
        let node = self.active(id)?;
        if node.lifecycle != Lifecycle::Detached {
            return Err(DrawerError::AlreadyAttached(id).structural());
        }
        let attached = match node.parent {
            Some(parent) => self
                .nodes
                .get(parent)
                .and_then(DrawerNode::as_parent)
                .is_some_and(|state| state.members.contains(&id)),
            None => self.roots.contains(&id),
        };
        if !attached {
            let error = match node.parent {
                Some(parent) => DrawerError::NotAMember { parent, member: id },
                None => DrawerError::InvalidDrawerId(id),
            };
            return Err(error.structural());
        }

        let eager = node
            .as_parent()
            .is_some_and(|state| state.fold.is_potentially_visible() && !state.built)
            && !self.repeats_ancestor_type(id);
        self.active_mut(id)?.lifecycle = Lifecycle::Active;
        if eager {
            self.ensure_members_built(id)?;
        }
        Ok(())
    }

    /// Create a top-level drawer.
    pub fn create_root(&mut self, handle: &MemberHandle) -> InspectorResult<DrawerId> {
        let id = self.acquire(handle.kind);
        if let Err(error) = self.setup(id, handle, None) {
            self.release_subtree(id)?;
            return Err(error);
        }
        self.roots.push(id);
        self.late_setup(id)?;
        if self.filter.is_some() {
            self.refilter_subtree(id)?;
        } else {
            self.rebuild_visible_roots(true);
        }
        Ok(id)
    }

    /// Dispose a drawer and its whole subtree.
    ///
    /// A member is removed from its parent through
    /// [`set_members`](Self::set_members), so the parent's visible list and
    /// visibility events stay consistent.
    pub fn dispose(&mut self, id: DrawerId) -> InspectorResult<()> {
        let node = self.get(id)?;
        if node.is_pooled() {
            return Err(DrawerError::DoubleRelease(id).structural());
        }
        let attached = node.lifecycle == Lifecycle::Active;
        let parent = node.parent;
        match parent {
            Some(parent) if attached => {
                let members = self
                    .parent_state(parent)?
                    .members
                    .iter()
                    .copied()
                    .filter(|&member| member != id)
                    .collect();
                self.set_members(parent, members, true)
            }
            None if self.roots.contains(&id) => {
                self.roots.retain(|&root| root != id);
                self.visible_roots.retain(|&root| root != id);
                self.set_listed(id, false, true);
                self.release_subtree(id)
            }
            _ => self.release_subtree(id),
        }
    }

    /// Dispose every root.
    pub fn clear(&mut self) -> InspectorResult<()> {
        while let Some(&root) = self.roots.last() {
            self.dispose(root)?;
        }
        Ok(())
    }

    /// Reset `id` and its members and return them to the pool. No
    /// visibility events fire.
    pub(crate) fn release_subtree(&mut self, id: DrawerId) -> InspectorResult<()> {
        let node = self.get(id)?;
        if node.is_pooled() {
            return Err(DrawerError::DoubleRelease(id).structural());
        }
        let kind = node.kind;
        let count = node.as_parent().map_or(0, |state| state.members.len());
        for index in 0..count {
            let member = self.parent_state(id)?.members[index];
            self.release_subtree(member)?;
        }

        if self.selection.is_some_and(|handle| handle.id() == id) {
            self.selection = None;
        }
        let node = self.active_mut(id)?;
        node.reset();
        node.generation = node.generation.next();
        node.lifecycle = Lifecycle::Pooled;

        match self.pool.release(kind, id)? {
            Release::Pooled => {}
            Release::Discard => {
                self.nodes.remove(id);
            }
        }
        Ok(())
    }

    /// Destroy every pooled drawer, freeing its slot.
    pub fn shrink_pool(&mut self) -> usize {
        let drained = self.pool.drain();
        for &id in &drained {
            self.nodes.remove(id);
        }
        tracing::debug!(target: targets::POOL, count = drained.len(), "shrank drawer pool");
        drained.len()
    }

    /// Counters for the pool of `kind`.
    pub fn pool_stats(&self, kind: DrawerKind) -> PoolStats {
        self.pool.stats(kind)
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Top-level drawers.
    pub fn roots(&self) -> &[DrawerId] {
        &self.roots
    }

    /// Top-level drawers that pass the active filter.
    pub fn visible_roots(&self) -> &[DrawerId] {
        &self.visible_roots
    }

    /// All constructed members of `id`.
    pub fn members(&self, id: DrawerId) -> InspectorResult<&[DrawerId]> {
        Ok(&self.parent_state(id)?.members)
    }

    /// Members of `id` currently eligible for display.
    pub fn visible_members(&self, id: DrawerId) -> InspectorResult<&[DrawerId]> {
        Ok(&self.parent_state(id)?.visible_members)
    }

    /// The parent of `id`.
    pub fn parent(&self, id: DrawerId) -> InspectorResult<Option<DrawerId>> {
        Ok(self.active(id)?.parent)
    }

    /// The visible list that `id` is (or would be) part of.
    pub(crate) fn visible_siblings(&self, id: DrawerId) -> &[DrawerId] {
        match self.nodes.get(id).and_then(|node| node.parent) {
            Some(parent) => self
                .nodes
                .get(parent)
                .and_then(DrawerNode::as_parent)
                .map_or(&[], |state| state.visible_members.as_slice()),
            None => &self.visible_roots,
        }
    }

    pub(crate) fn layout_of(&self, id: DrawerId) -> Option<MemberLayout> {
        self.nodes
            .get(id)
            .and_then(DrawerNode::as_parent)
            .map(|state| state.layout)
    }

    /// Whether `ancestor` is `id` or one of its parents.
    pub fn is_ancestor_of(&self, ancestor: DrawerId, id: DrawerId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == ancestor {
                return true;
            }
            current = self.nodes.get(current_id).and_then(|node| node.parent);
        }
        false
    }

    /// Whether a parent above `id` has the same type. Building such a drawer
    /// without being asked to would never terminate for a recursive type.
    pub(crate) fn repeats_ancestor_type(&self, id: DrawerId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        let Some(owner) = node.type_handle.as_ref() else {
            return false;
        };
        let mut current = node.parent;
        while let Some(parent) = current.and_then(|parent| self.nodes.get(parent)) {
            if parent.type_handle.as_ref() == Some(owner) {
                return true;
            }
            current = parent.parent;
        }
        false
    }

    /// Number of parents above `id`.
    pub fn depth(&self, id: DrawerId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes.get(id).and_then(|node| node.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes.get(parent).and_then(|node| node.parent);
        }
        depth
    }

    // =========================================================================
    // Drawer state
    // =========================================================================

    /// Record where `id` was last drawn.
    pub fn set_bounds(&mut self, id: DrawerId, bounds: Rect) -> InspectorResult<()> {
        self.active_mut(id)?.bounds = bounds;
        Ok(())
    }

    /// Apply a user edit.
    ///
    /// Read-only drawers reject the edit, as do values of the wrong shape for
    /// the drawer's kind. With a filter active, the drawer and its ancestors
    /// are filtered again.
    pub fn set_value(&mut self, id: DrawerId, value: DrawerValue) -> InspectorResult<()> {
        let node = self.active_mut(id)?;
        if node.read_only {
            return Err(DrawerError::ReadOnly(id));
        }
        if !node.kind.accepts(&value) {
            return Err(DrawerError::ValueMismatch {
                id,
                kind: node.kind.name(),
            });
        }
        node.value = value;
        if self.filter.is_some() {
            self.refilter_subtree(id)?;
        }
        Ok(())
    }

    /// Change the type a parent shows.
    ///
    /// Built members are rebuilt from the new type's build list, reusing
    /// members whose key and kind still match.
    pub fn set_type_handle(
        &mut self,
        id: DrawerId,
        type_handle: Option<TypeHandle>,
    ) -> InspectorResult<()> {
        let node = self.active_mut(id)?;
        if node.type_handle == type_handle {
            return Ok(());
        }
        node.type_handle = type_handle;
        let Some(state) = node.parent_state_mut() else {
            return Ok(());
        };
        state.build_list = None;
        if state.built {
            self.reconcile_members(id)?;
        }
        Ok(())
    }

    /// Find the deepest displayed drawer whose bounds contain `point`.
    pub fn hit_test(&self, point: Point) -> Option<DrawerId> {
        let mut best = None;
        for &root in &self.visible_roots {
            self.hit_test_in(root, point, 0, &mut best);
        }
        best.map(|(_, id)| id)
    }

    fn hit_test_in(
        &self,
        id: DrawerId,
        point: Point,
        depth: usize,
        best: &mut Option<(usize, DrawerId)>,
    ) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.bounds.contains(point) && best.is_none_or(|(best_depth, _)| depth > best_depth) {
            *best = Some((depth, id));
        }
        if let Some(state) = node.as_parent() {
            for &member in &state.visible_members {
                self.hit_test_in(member, point, depth + 1, best);
            }
        }
    }
}
