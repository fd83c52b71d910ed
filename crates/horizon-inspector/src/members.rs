//! Member construction and the two member arrays.
//!
//! A parent's `members` hold every constructed child, one per build-list
//! entry. `visible_members` is the ordered subset eligible for display and is
//! recomputed from scratch whenever fold state, filter or the member set
//! changes. Each drawer's `listed` flag mirrors whether it is in its parent's
//! visible list, which is what makes visibility events fire exactly once per
//! transition.

use std::collections::HashSet;

use horizon_inspector_core::logging::targets;
use horizon_inspector_core::{DrawerError, DrawerHandle, DrawerId, InspectorResult, PerfSpan};

use crate::events::VisibilityEvent;
use crate::member::MemberHandle;
use crate::node::{DrawerNode, Lifecycle};
use crate::tree::DrawerTree;

impl DrawerTree {
    /// Construct the members of `parent` if that has not happened yet.
    ///
    /// The build list is requested from the resolver on first use and cached
    /// on the parent. A type the resolver knows nothing about has no
    /// members. Calling this on a built parent does nothing.
    pub fn ensure_members_built(&mut self, parent: DrawerId) -> InspectorResult<()> {
        if self.parent_state(parent)?.built {
            return Ok(());
        }
        let _span = PerfSpan::new("ensure_members_built");
        let list = self.build_list(parent)?;
        let members = self.materialize(parent, &list, &[])?;
        if members.len() != list.len() {
            return Err(DrawerError::MemberCountMismatch {
                parent,
                expected: list.len(),
                actual: members.len(),
            }
            .structural());
        }
        tracing::trace!(target: targets::MEMBERS, ?parent, count = members.len(), "built members");
        self.set_members(parent, members, true)
    }

    /// Re-resolve the build list of `parent` and rebuild its members.
    ///
    /// The resolver's cache for the parent's type is invalidated first.
    /// Members whose key, kind and type still match are kept; the rest are
    /// disposed. Unbuilt parents only drop their cached build list.
    pub fn rebuild_members(&mut self, parent: DrawerId) -> InspectorResult<()> {
        let state = self.parent_state_mut(parent)?;
        state.build_list = None;
        let built = state.built;
        if let Some(owner) = self.active(parent)?.type_handle.clone() {
            self.resolver.invalidate(&owner);
        }
        if built {
            self.reconcile_members(parent)?;
        }
        Ok(())
    }

    /// Rebuild built members from a freshly resolved build list.
    pub(crate) fn reconcile_members(&mut self, parent: DrawerId) -> InspectorResult<()> {
        let _span = PerfSpan::new("rebuild_members");
        let list = self.build_list(parent)?;
        let existing = self.parent_state(parent)?.members.clone();
        let members = self.materialize(parent, &list, &existing)?;
        if members.len() != list.len() {
            return Err(DrawerError::MemberCountMismatch {
                parent,
                expected: list.len(),
                actual: members.len(),
            }
            .structural());
        }
        tracing::trace!(target: targets::MEMBERS, ?parent, count = members.len(), "rebuilt members");
        self.set_members(parent, members, true)
    }

    /// The cached build list of `parent`, resolving it on first use.
    fn build_list(&mut self, parent: DrawerId) -> InspectorResult<Vec<MemberHandle>> {
        let node = self.active(parent)?;
        if let Some(list) = node.as_parent().and_then(|state| state.build_list.as_ref()) {
            return Ok(list.clone());
        }
        let list = match node.type_handle.clone() {
            Some(owner) => self.resolver.resolve_members(&owner).unwrap_or_default(),
            None => Vec::new(),
        };
        self.parent_state_mut(parent)?.build_list = Some(list.clone());
        Ok(list)
    }

    /// Produce one drawer per build-list entry, reusing drawers from
    /// `existing` whose identity matches.
    fn materialize(
        &mut self,
        parent: DrawerId,
        list: &[MemberHandle],
        existing: &[DrawerId],
    ) -> InspectorResult<Vec<DrawerId>> {
        let mut reused = vec![false; existing.len()];
        let mut members = Vec::with_capacity(list.len());
        let mut fresh = Vec::new();

        for handle in list {
            let found = existing.iter().enumerate().find(|&(index, &member)| {
                !reused[index]
                    && self.nodes.get(member).is_some_and(|node| {
                        node.kind == handle.kind
                            && node.key.as_ref() == Some(&handle.key)
                            && node.type_handle == handle.type_handle
                    })
            });
            if let Some((index, &member)) = found {
                reused[index] = true;
                let node = self.active_mut(member)?;
                node.label.clone_from(&handle.label);
                node.value = handle.value.clone();
                node.read_only = handle.read_only;
                members.push(member);
                continue;
            }

            let id = self.acquire(handle.kind);
            if let Err(error) = self.setup(id, handle, Some(parent)) {
                self.release_subtree(id)?;
                for id in fresh {
                    self.release_subtree(id)?;
                }
                return Err(error);
            }
            fresh.push(id);
            members.push(id);
        }
        Ok(members)
    }

    /// Replace the members of `parent` wholesale.
    ///
    /// Members missing from `members` are disposed. New members are attached
    /// and late-set-up. The visible list is rebuilt afterwards; with
    /// `send_events`, every member that enters or leaves it is notified
    /// exactly once, otherwise nothing fires.
    pub fn set_members(
        &mut self,
        parent: DrawerId,
        members: Vec<DrawerId>,
        send_events: bool,
    ) -> InspectorResult<()> {
        self.parent_state(parent)?;
        let incoming = self.validate_members(parent, &members)?;

        let dropped: Vec<DrawerId> = self
            .parent_state(parent)?
            .members
            .iter()
            .copied()
            .filter(|member| !incoming.contains(member))
            .collect();
        for &member in &dropped {
            self.set_listed(member, false, send_events);
        }
        self.parent_state_mut(parent)?
            .visible_members
            .retain(|member| incoming.contains(member));
        for &member in &dropped {
            self.release_subtree(member)?;
        }

        let mut attach = Vec::new();
        let mut handles = Vec::with_capacity(members.len());
        for &member in &members {
            let node = self.active_mut(member)?;
            node.parent = Some(parent);
            if node.lifecycle == Lifecycle::Detached {
                attach.push(member);
            }
            handles.push(node.to_member_handle());
        }

        tracing::trace!(
            target: targets::MEMBERS,
            ?parent,
            count = members.len(),
            dropped = dropped.len(),
            attached = attach.len(),
            "set members"
        );
        let state = self.parent_state_mut(parent)?;
        state.members = members;
        state.built = true;
        state.build_list = Some(handles);

        // A filter pass covering the new members runs below, so nested
        // builds must not rebuild visible lists on their own.
        let defer = self.filter.is_some() && !self.filter_pass;
        if defer {
            self.filter_pass = true;
        }
        let attached = attach
            .into_iter()
            .try_for_each(|member| self.late_setup(member));
        if defer {
            self.filter_pass = false;
        }
        attached?;

        if self.filter_pass {
            Ok(())
        } else if self.filter.is_some() {
            self.refilter_with(parent, send_events).map(|_| ())
        } else {
            self.rebuild_visible_members(parent, send_events)
        }
    }

    fn validate_members(
        &self,
        parent: DrawerId,
        members: &[DrawerId],
    ) -> InspectorResult<HashSet<DrawerId>> {
        let mut seen = HashSet::with_capacity(members.len());
        for &member in members {
            let node = self.get(member)?;
            if node.is_pooled() {
                return Err(DrawerError::Pooled(member).structural());
            }
            if !seen.insert(member) {
                return Err(DrawerError::DuplicateMember(member).structural());
            }
            if self.is_ancestor_of(member, parent) {
                return Err(DrawerError::CircularMembership(member).structural());
            }
            let elsewhere = match node.parent {
                Some(owner) => owner != parent,
                None => node.lifecycle == Lifecycle::Active,
            };
            if elsewhere {
                return Err(DrawerError::AlreadyAttached(member).structural());
            }
        }
        Ok(seen)
    }

    /// Recompute `visible_members` of `parent` from its members.
    ///
    /// While filtering, a member is visible when it passed the filter;
    /// auxiliary controls are suppressed. Otherwise every member is visible
    /// while the parent is potentially unfolded, and only auxiliary controls
    /// are visible while it is folded.
    pub(crate) fn rebuild_visible_members(
        &mut self,
        parent: DrawerId,
        send_events: bool,
    ) -> InspectorResult<()> {
        let filtering = self.is_filtering();
        let state = self.parent_state_mut(parent)?;
        let open = filtering || state.fold.is_potentially_visible();
        let mut visible = std::mem::take(&mut state.visible_members);
        visible.clear();

        let count = state.members.len();
        for index in 0..count {
            let member = self.parent_state(parent)?.members[index];
            let node = self.get(member)?;
            let show = if filtering {
                node.should_show && !node.kind.is_auxiliary()
            } else {
                open || node.kind.is_auxiliary()
            };
            if show {
                visible.push(member);
            }
            self.set_listed(member, show, send_events);
        }

        self.parent_state_mut(parent)?.visible_members = visible;
        Ok(())
    }

    /// Recompute the visible roots.
    pub(crate) fn rebuild_visible_roots(&mut self, send_events: bool) {
        let filtering = self.is_filtering();
        let mut visible = std::mem::take(&mut self.visible_roots);
        visible.clear();
        for index in 0..self.roots.len() {
            let root = self.roots[index];
            let show = !filtering || self.nodes.get(root).is_some_and(|node| node.should_show);
            if show {
                visible.push(root);
            }
            self.set_listed(root, show, send_events);
        }
        self.visible_roots = visible;
    }

    /// Update the listed flag of `id`, notifying on a real transition.
    pub(crate) fn set_listed(&mut self, id: DrawerId, listed: bool, send_events: bool) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.listed == listed {
            return;
        }
        node.listed = listed;
        let handle = DrawerHandle::new(id, node.generation);
        if send_events {
            tracing::trace!(target: targets::MEMBERS, ?id, visible = listed, "visibility changed");
            self.visibility_changed.emit(VisibilityEvent {
                handle,
                visible: listed,
            });
        }
    }

    /// Members of `parent` that are currently built, with their drawers.
    pub fn member_nodes(
        &self,
        parent: DrawerId,
    ) -> InspectorResult<impl Iterator<Item = (DrawerId, &DrawerNode)> + '_> {
        let state = self.parent_state(parent)?;
        Ok(state
            .members
            .iter()
            .filter_map(|&id| self.nodes.get(id).map(|node| (id, node))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::DrawerKind;
    use crate::member::{CachedResolver, MemberResolver, TypeHandle, TypeTable};
    use crate::value::DrawerValue;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::Arc;

    fn types() -> TypeTable {
        TypeTable::new()
            .with(
                "Light",
                vec![
                    MemberHandle::new("Intensity", DrawerKind::Float).with_value(1.0),
                    MemberHandle::new("Color", DrawerKind::Inline).with_type("Color"),
                    MemberHandle::new("Enabled", DrawerKind::Bool),
                ],
            )
            .with(
                "Color",
                vec![
                    MemberHandle::new("r", DrawerKind::Float),
                    MemberHandle::new("g", DrawerKind::Float),
                    MemberHandle::new("b", DrawerKind::Float),
                ],
            )
            .with(
                "Lights",
                vec![
                    MemberHandle::new("Element 0", DrawerKind::Composite).with_type("Light"),
                    MemberHandle::new("Add", DrawerKind::AddButton),
                ],
            )
    }

    fn light() -> MemberHandle {
        MemberHandle::new("Light", DrawerKind::Composite).with_type("Light")
    }

    fn collect_events(tree: &DrawerTree) -> Arc<parking_lot::Mutex<Vec<VisibilityEvent>>> {
        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        tree.visibility_changed()
            .connect(move |event| sink.lock().push(*event));
        events
    }

    #[test]
    fn test_ensure_members_built_is_idempotent() {
        let mut tree = DrawerTree::new(types());
        let root = tree.create_root(&light()).unwrap();
        tree.ensure_members_built(root).unwrap();
        let first = tree.members(root).unwrap().to_vec();
        assert_eq!(first.len(), 3);

        tree.ensure_members_built(root).unwrap();
        assert_eq!(tree.members(root).unwrap(), first.as_slice());
        // Built but still folded: nothing visible.
        assert!(tree.visible_members(root).unwrap().is_empty());
    }

    #[test]
    fn test_members_link_back_to_parent() {
        let mut tree = DrawerTree::new(types());
        let root = tree.create_root(&light()).unwrap();
        tree.ensure_members_built(root).unwrap();
        for &member in tree.members(root).unwrap() {
            assert_eq!(tree.parent(member).unwrap(), Some(root));
            assert_eq!(tree.node(member).unwrap().lifecycle(), Lifecycle::Active);
        }
    }

    #[test]
    fn test_inline_members_build_with_parent() {
        let mut tree = DrawerTree::new(types());
        let root = tree.create_root(&light()).unwrap();
        tree.ensure_members_built(root).unwrap();
        let color = tree.members(root).unwrap()[1];
        assert_eq!(tree.members(color).unwrap().len(), 3);
        assert_eq!(tree.visible_members(color).unwrap().len(), 3);
    }

    #[test]
    fn test_unknown_type_has_no_members() {
        let mut tree = DrawerTree::new(TypeTable::new());
        let root = tree
            .create_root(&MemberHandle::new("Mystery", DrawerKind::Composite).with_type("Mystery"))
            .unwrap();
        tree.ensure_members_built(root).unwrap();
        assert!(tree.members(root).unwrap().is_empty());
        assert!(tree.node(root).unwrap().as_parent().unwrap().built);
    }

    #[test]
    fn test_resolver_called_once_per_type() {
        let calls = Rc::new(Cell::new(0));
        let counted = Rc::clone(&calls);
        let mut table = types();
        let mut tree = DrawerTree::new(CachedResolver::new(move |owner: &TypeHandle| {
            counted.set(counted.get() + 1);
            table.resolve_members(owner)
        }));
        for _ in 0..3 {
            let root = tree.create_root(&light()).unwrap();
            tree.ensure_members_built(root).unwrap();
        }
        // Three lights, each with an inline color: two distinct types.
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_collection_add_button_visible_while_folded() {
        let mut tree = DrawerTree::new(types());
        let list = tree
            .create_root(&MemberHandle::new("Lights", DrawerKind::Collection).with_type("Lights"))
            .unwrap();
        tree.ensure_members_built(list).unwrap();
        let members = tree.members(list).unwrap().to_vec();
        assert_eq!(tree.visible_members(list).unwrap(), &[members[1]]);
    }

    #[test]
    fn test_set_members_disposes_dropped() {
        let mut tree = DrawerTree::new(types());
        let root = tree.create_root(&light()).unwrap();
        tree.ensure_members_built(root).unwrap();
        let members = tree.members(root).unwrap().to_vec();
        let color = members[1];
        let red = tree.members(color).unwrap()[0];

        tree.set_members(root, vec![members[0], members[2]], true).unwrap();
        assert_eq!(tree.members(root).unwrap(), &[members[0], members[2]]);
        assert!(tree.node(color).unwrap().is_pooled());
        assert!(tree.node(red).unwrap().is_pooled());
    }

    #[test]
    fn test_set_members_attaches_new_drawer() {
        let mut tree = DrawerTree::new(types());
        let root = tree.create_root(&light()).unwrap();
        tree.set_unfolded(root, true).unwrap();
        let extra = tree.acquire(DrawerKind::Text);
        tree.setup(extra, &MemberHandle::new("Note", DrawerKind::Text), None)
            .unwrap();

        let mut members = tree.members(root).unwrap().to_vec();
        members.push(extra);
        tree.set_members(root, members.clone(), true).unwrap();
        assert_eq!(tree.parent(extra).unwrap(), Some(root));
        assert_eq!(tree.visible_members(root).unwrap(), members.as_slice());
        let list = tree.node(root).unwrap().as_parent().unwrap().build_list.clone().unwrap();
        assert_eq!(list.len(), members.len());
    }

    #[test]
    fn test_visibility_events_fire_once() {
        let mut tree = DrawerTree::new(types());
        let root = tree.create_root(&light()).unwrap();
        let events = collect_events(&tree);

        tree.set_unfolded(root, true).unwrap();
        let members = tree.members(root).unwrap().to_vec();
        let visible = events
            .lock()
            .iter()
            .filter(|event| event.visible && members.contains(&event.handle.id()))
            .count();
        assert_eq!(visible, 3);

        events.lock().clear();
        tree.rebuild_visible_members(root, true).unwrap();
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_set_members_without_events() {
        let mut tree = DrawerTree::new(types());
        let root = tree.create_root(&light()).unwrap();
        tree.set_unfolded(root, true).unwrap();
        let events = collect_events(&tree);

        tree.set_members(root, Vec::new(), false).unwrap();
        assert!(events.lock().is_empty());
        assert!(tree.visible_members(root).unwrap().is_empty());
    }

    #[test]
    fn test_set_members_reports_removed_member() {
        let mut tree = DrawerTree::new(types());
        let root = tree.create_root(&light()).unwrap();
        tree.set_unfolded(root, true).unwrap();
        let members = tree.members(root).unwrap().to_vec();
        let removed = tree.handle(members[2]).unwrap();
        let events = collect_events(&tree);

        tree.set_members(root, members[..2].to_vec(), true).unwrap();
        assert_eq!(
            events.lock().as_slice(),
            &[VisibilityEvent {
                handle: removed,
                visible: false
            }]
        );
    }

    #[test]
    fn test_rebuild_members_reuses_by_key() {
        let mut tree = DrawerTree::new(CachedResolver::new(types()));
        let root = tree.create_root(&light()).unwrap();
        tree.ensure_members_built(root).unwrap();
        let before = tree.members(root).unwrap().to_vec();

        tree.rebuild_members(root).unwrap();
        assert_eq!(tree.members(root).unwrap(), before.as_slice());
    }

    #[test]
    fn test_set_type_handle_rebuilds() {
        let mut tree = DrawerTree::new(types());
        let root = tree.create_root(&light()).unwrap();
        tree.ensure_members_built(root).unwrap();
        let intensity = tree.members(root).unwrap()[0];

        tree.set_type_handle(root, Some("Color".into())).unwrap();
        let members = tree.members(root).unwrap().to_vec();
        assert_eq!(members.len(), 3);
        assert_eq!(tree.node(members[0]).unwrap().label(), "r");
        assert!(tree.node(intensity).unwrap().is_pooled());
    }

    #[test]
    fn test_reused_member_takes_fresh_value() {
        let shared = Rc::new(RefCell::new(types()));
        let source = Rc::clone(&shared);
        let mut tree =
            DrawerTree::new(move |owner: &TypeHandle| source.borrow_mut().resolve_members(owner));
        let root = tree.create_root(&light()).unwrap();
        tree.ensure_members_built(root).unwrap();
        let intensity = tree.members(root).unwrap()[0];

        shared.borrow_mut().insert(
            "Light",
            vec![
                MemberHandle::new("Intensity", DrawerKind::Float).with_value(4.0),
                MemberHandle::new("Color", DrawerKind::Inline).with_type("Color"),
                MemberHandle::new("Enabled", DrawerKind::Bool),
            ],
        );
        tree.rebuild_members(root).unwrap();
        assert_eq!(tree.members(root).unwrap()[0], intensity);
        assert_eq!(tree.node(intensity).unwrap().value(), &DrawerValue::Float(4.0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "more than once")]
    fn test_duplicate_member_panics_in_debug() {
        let mut tree = DrawerTree::new(types());
        let root = tree.create_root(&light()).unwrap();
        tree.ensure_members_built(root).unwrap();
        let first = tree.members(root).unwrap()[0];
        let _ = tree.set_members(root, vec![first, first], true);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "own subtree")]
    fn test_circular_member_panics_in_debug() {
        let mut tree = DrawerTree::new(types());
        let root = tree.create_root(&light()).unwrap();
        tree.ensure_members_built(root).unwrap();
        let color = tree.members(root).unwrap()[1];
        let _ = tree.set_members(color, vec![root], true);
    }
}
