//! Drag-and-drop reordering of collection members.
//!
//! The coordinator only computes drop positions and applies the resulting
//! mutation. Every change is routed through
//! [`set_members`](DrawerTree::set_members), so visible lists and visibility
//! events stay consistent with any other structural change.

use horizon_inspector_core::logging::targets;
use horizon_inspector_core::{DrawerError, DrawerId, InspectorResult, Point};

use crate::member::MemberHandle;
use crate::node::DrawerNode;
use crate::tree::DrawerTree;
use crate::value::DrawerValue;

/// Operations used by drag-and-drop collaborators on reorderable parents.
///
/// Indices count reorderable members only; auxiliary controls such as the
/// add button always stay after them.
pub trait ReorderCoordinator {
    /// The insertion index for a drop at `point`, or `None` when the point is
    /// outside the parent's area or the parent cannot be reordered.
    fn drop_target_index_at(&self, parent: DrawerId, point: Point) -> Option<usize>;

    /// Whether `member` can be dragged, deleted or moved.
    fn member_is_reorderable(&self, member: DrawerId) -> bool;

    /// Remove `member` from its parent and dispose it.
    fn delete_member(&mut self, member: DrawerId) -> InspectorResult<()>;

    /// Create a drawer from `handle` and insert it at `index`.
    fn insert_member(
        &mut self,
        parent: DrawerId,
        index: usize,
        handle: &MemberHandle,
    ) -> InspectorResult<DrawerId>;

    /// Move `member` to `index` among its reorderable siblings.
    fn move_member(&mut self, parent: DrawerId, member: DrawerId, index: usize)
    -> InspectorResult<()>;

    /// A drag of `member` began.
    fn on_member_reordering_started(&mut self, member: DrawerId) -> InspectorResult<()>;

    /// A drag of `member` finished or was cancelled.
    fn on_member_reordering_ended(&mut self, member: DrawerId) -> InspectorResult<()>;
}

impl DrawerTree {
    fn is_reorderable_parent(&self, parent: DrawerId) -> bool {
        self.nodes
            .get(parent)
            .filter(|node| !node.is_pooled())
            .is_some_and(|node| node.as_reorderable().is_some() && !node.read_only)
    }

    fn reorderable_members(&self, parent: DrawerId) -> InspectorResult<Vec<DrawerId>> {
        Ok(self
            .member_nodes(parent)?
            .filter(|(_, node)| !node.kind.is_auxiliary())
            .map(|(id, _)| id)
            .collect())
    }

    /// Reorderable members in their new order followed by the remaining
    /// auxiliary members.
    fn commit_order(&mut self, parent: DrawerId, order: Vec<DrawerId>) -> InspectorResult<()> {
        let count = order.len();
        let auxiliary: Vec<DrawerId> = self
            .member_nodes(parent)?
            .filter(|(_, node)| node.kind.is_auxiliary())
            .map(|(id, _)| id)
            .collect();
        let mut members = order;
        members.extend(auxiliary);
        self.set_members(parent, members, true)?;

        let node = self.active_mut(parent)?;
        node.value = DrawerValue::Elements(count);
        if let Some(owner) = node.type_handle.clone() {
            self.resolver.invalidate(&owner);
        }
        Ok(())
    }

    fn reorder_parent_of(&self, member: DrawerId) -> InspectorResult<DrawerId> {
        if !self.member_is_reorderable(member) {
            return Err(DrawerError::NotReorderable(member));
        }
        self.active(member)?
            .parent
            .ok_or(DrawerError::NotReorderable(member))
    }
}

impl ReorderCoordinator for DrawerTree {
    fn drop_target_index_at(&self, parent: DrawerId, point: Point) -> Option<usize> {
        if !self.is_reorderable_parent(parent) {
            return None;
        }
        let node = self.nodes.get(parent)?;
        let visible = &node.as_parent()?.visible_members;
        // Undrawn rectangles sit at the origin and must not stretch the area.
        let area = std::iter::once(node.bounds)
            .chain(
                visible
                    .iter()
                    .filter_map(|&id| self.nodes.get(id).map(DrawerNode::bounds)),
            )
            .filter(|bounds| !bounds.is_empty())
            .reduce(|area, bounds| area.union(&bounds))?;
        if !area.contains(point) {
            return None;
        }

        let members = self.reorderable_members(parent).ok()?;
        for &id in visible {
            let Some(member) = self.nodes.get(id) else {
                continue;
            };
            if member.kind.is_auxiliary() {
                continue;
            }
            if point.y < member.bounds.center().y {
                return members.iter().position(|&m| m == id);
            }
        }
        Some(members.len())
    }

    fn member_is_reorderable(&self, member: DrawerId) -> bool {
        self.nodes
            .get(member)
            .filter(|node| !node.is_pooled() && !node.kind.is_auxiliary())
            .and_then(|node| node.parent)
            .is_some_and(|parent| self.is_reorderable_parent(parent))
    }

    fn delete_member(&mut self, member: DrawerId) -> InspectorResult<()> {
        let parent = self.reorder_parent_of(member)?;
        let mut order = self.reorderable_members(parent)?;
        order.retain(|&id| id != member);
        tracing::debug!(target: targets::REORDER, ?parent, ?member, "deleting member");
        self.commit_order(parent, order)
    }

    fn insert_member(
        &mut self,
        parent: DrawerId,
        index: usize,
        handle: &MemberHandle,
    ) -> InspectorResult<DrawerId> {
        if !self.is_reorderable_parent(parent) {
            return Err(DrawerError::NotReorderable(parent));
        }
        self.ensure_members_built(parent)?;
        let mut order = self.reorderable_members(parent)?;
        if index > order.len() {
            return Err(DrawerError::IndexOutOfRange {
                index,
                len: order.len(),
            });
        }

        let id = self.acquire(handle.kind);
        if let Err(error) = self.setup(id, handle, Some(parent)) {
            self.release_subtree(id)?;
            return Err(error);
        }
        order.insert(index, id);
        tracing::debug!(target: targets::REORDER, ?parent, ?id, index, "inserting member");
        self.commit_order(parent, order)?;
        Ok(id)
    }

    fn move_member(
        &mut self,
        parent: DrawerId,
        member: DrawerId,
        index: usize,
    ) -> InspectorResult<()> {
        if self.reorder_parent_of(member)? != parent {
            return Err(DrawerError::NotAMember { parent, member }.structural());
        }
        let mut order = self.reorderable_members(parent)?;
        if index >= order.len() {
            return Err(DrawerError::IndexOutOfRange {
                index,
                len: order.len(),
            });
        }
        order.retain(|&id| id != member);
        order.insert(index, member);
        tracing::debug!(target: targets::REORDER, ?parent, ?member, index, "moving member");
        self.commit_order(parent, order)
    }

    fn on_member_reordering_started(&mut self, member: DrawerId) -> InspectorResult<()> {
        let parent = self.reorder_parent_of(member)?;
        self.parent_state_mut(parent)?.reordering = Some(member);
        tracing::trace!(target: targets::REORDER, ?parent, ?member, "reordering started");
        Ok(())
    }

    fn on_member_reordering_ended(&mut self, member: DrawerId) -> InspectorResult<()> {
        let Some(parent) = self.active(member)?.parent else {
            return Ok(());
        };
        let state = self.parent_state_mut(parent)?;
        if state.reordering == Some(member) {
            state.reordering = None;
            tracing::trace!(target: targets::REORDER, ?parent, ?member, "reordering ended");
        }
        Ok(())
    }
}
