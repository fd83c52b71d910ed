//! The navigation router.
//!
//! The displayed tree is a sequence of rows. A vertical parent contributes
//! its own header row followed by the rows of each visible member. A
//! horizontal parent is a single row whose cells are its visible members.
//! The roots form a vertical list without a header.
//!
//! Moving up or down carries a column index so that focus lands on the
//! matching cell of the next row; rows with fewer cells clamp the column to
//! their last cell. A dead end returns `None` and focus stays where it is.

use horizon_inspector_core::logging::targets;
use horizon_inspector_core::{DrawerId, InspectorResult};

use crate::kind::MemberLayout;
use crate::node::{DrawerNode, Lifecycle};
use crate::tree::DrawerTree;

/// A keyboard direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Previous row.
    Up,
    /// Next row.
    Down,
    /// Previous cell in the row.
    Left,
    /// Next cell in the row.
    Right,
}

/// Who is asking a drawer for the next focus target.
///
/// The same drawer answers differently depending on whether navigation is
/// starting at it, entering it from outside, or leaving one of its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requester {
    /// Navigation starts at the drawer itself.
    User,
    /// The drawer's parent is entering it.
    Parent,
    /// An adjacent row is entering it.
    Sibling,
    /// The given member ran out of rows in the requested direction.
    Child(DrawerId),
}

impl DrawerTree {
    /// The drawer that should receive focus after moving from `node`.
    ///
    /// Left and Right wrap into adjacent rows when the configuration says so.
    pub fn next(
        &self,
        node: DrawerId,
        direction: Direction,
        column: usize,
        requester: Requester,
    ) -> Option<DrawerId> {
        let wrap = self.config.navigation.wrap_rows;
        self.next_with(node, direction, column, requester, wrap)
    }

    /// Like [`next`](Self::next) with an explicit choice of whether Left and
    /// Right continue into the previous or next row at a row boundary.
    pub fn next_wrapping(
        &self,
        node: DrawerId,
        direction: Direction,
        column: usize,
        wrap: bool,
    ) -> Option<DrawerId> {
        self.next_with(node, direction, column, Requester::User, wrap)
    }

    fn next_with(
        &self,
        node: DrawerId,
        direction: Direction,
        column: usize,
        requester: Requester,
        wrap: bool,
    ) -> Option<DrawerId> {
        self.nodes
            .get(node)
            .filter(|drawer| drawer.lifecycle == Lifecycle::Active)?;
        match (direction, requester) {
            (Direction::Left | Direction::Right, _) => self.step_in_row(node, direction, wrap),
            (Direction::Down, Requester::User) => self.down_from(self.row_owner(node), column),
            (Direction::Up, Requester::User) => self.up_from(self.row_owner(node), column),
            (Direction::Down, Requester::Parent | Requester::Sibling) => {
                Some(self.enter_from_above(node, column))
            }
            (Direction::Up, Requester::Parent | Requester::Sibling) => {
                Some(self.enter_from_below(node, column))
            }
            (Direction::Down, Requester::Child(member)) => self.after_member(node, member, column),
            (Direction::Up, Requester::Child(member)) => self.before_member(node, member, column),
        }
    }

    /// The column of `id` within its row.
    pub fn column_of(&self, id: DrawerId) -> usize {
        let owner = self.row_owner(id);
        if owner == id {
            return 0;
        }
        self.row_cells(owner)
            .and_then(|cells| {
                cells
                    .iter()
                    .position(|&cell| self.is_ancestor_of(cell, id))
            })
            .unwrap_or(0)
    }

    /// The drawer that owns the row containing `id`: `id` itself unless it
    /// sits inside a horizontal parent.
    pub fn row_owner(&self, id: DrawerId) -> DrawerId {
        let mut owner = id;
        while let Some(parent) = self.nodes.get(owner).and_then(|node| node.parent) {
            if self.layout_of(parent) != Some(MemberLayout::Horizontal) {
                break;
            }
            owner = parent;
        }
        owner
    }

    /// Cells of the row owned by `owner`, when it has more than itself.
    fn row_cells(&self, owner: DrawerId) -> Option<&[DrawerId]> {
        let state = self.nodes.get(owner).and_then(DrawerNode::as_parent)?;
        (state.layout == MemberLayout::Horizontal && !state.visible_members.is_empty())
            .then_some(state.visible_members.as_slice())
    }

    fn cell_at(&self, owner: DrawerId, column: usize) -> DrawerId {
        match self.row_cells(owner) {
            Some(cells) => cells[column.min(cells.len() - 1)],
            None => owner,
        }
    }

    /// Visible members of a vertical parent, the rows below its header.
    fn rows_below(&self, owner: DrawerId) -> Option<&[DrawerId]> {
        let state = self.nodes.get(owner).and_then(DrawerNode::as_parent)?;
        (state.layout == MemberLayout::Vertical && !state.visible_members.is_empty())
            .then_some(state.visible_members.as_slice())
    }

    /// The first row of `owner`'s subtree is its own.
    fn enter_from_above(&self, owner: DrawerId, column: usize) -> DrawerId {
        self.cell_at(owner, column)
    }

    /// The last row of `owner`'s subtree.
    fn enter_from_below(&self, owner: DrawerId, column: usize) -> DrawerId {
        let mut last = owner;
        while let Some(&below) = self.rows_below(last).and_then(<[DrawerId]>::last) {
            last = below;
        }
        self.cell_at(last, column)
    }

    fn down_from(&self, owner: DrawerId, column: usize) -> Option<DrawerId> {
        if let Some(&first) = self.rows_below(owner).and_then(<[DrawerId]>::first) {
            return self.next_with(first, Direction::Down, column, Requester::Parent, false);
        }
        self.after_row(owner, column)
    }

    fn up_from(&self, owner: DrawerId, column: usize) -> Option<DrawerId> {
        match self.nodes.get(owner).and_then(|node| node.parent) {
            Some(parent) => self.next_with(parent, Direction::Up, column, Requester::Child(owner), false),
            None => {
                let index = self.visible_roots.iter().position(|&root| root == owner)?;
                let previous = *self.visible_roots.get(index.checked_sub(1)?)?;
                self.next_with(previous, Direction::Up, column, Requester::Sibling, false)
            }
        }
    }

    /// The row after `owner`'s whole subtree.
    fn after_row(&self, owner: DrawerId, column: usize) -> Option<DrawerId> {
        match self.nodes.get(owner).and_then(|node| node.parent) {
            Some(parent) => {
                self.next_with(parent, Direction::Down, column, Requester::Child(owner), false)
            }
            None => {
                let index = self.visible_roots.iter().position(|&root| root == owner)?;
                let next = *self.visible_roots.get(index + 1)?;
                self.next_with(next, Direction::Down, column, Requester::Sibling, false)
            }
        }
    }

    fn after_member(&self, parent: DrawerId, member: DrawerId, column: usize) -> Option<DrawerId> {
        if self.layout_of(parent) == Some(MemberLayout::Horizontal) {
            return self.after_row(self.row_owner(parent), column);
        }
        let siblings = self.visible_siblings(member);
        let index = siblings.iter().position(|&sibling| sibling == member)?;
        match siblings.get(index + 1) {
            Some(&next) => self.next_with(next, Direction::Down, column, Requester::Sibling, false),
            None => self.after_row(parent, column),
        }
    }

    fn before_member(&self, parent: DrawerId, member: DrawerId, column: usize) -> Option<DrawerId> {
        if self.layout_of(parent) == Some(MemberLayout::Horizontal) {
            return self.up_from(self.row_owner(parent), column);
        }
        let siblings = self.visible_siblings(member);
        let index = siblings.iter().position(|&sibling| sibling == member)?;
        match index.checked_sub(1) {
            Some(previous) => {
                self.next_with(siblings[previous], Direction::Up, column, Requester::Sibling, false)
            }
            // The parent's header is the row above its first member.
            None => Some(self.cell_at(parent, column)),
        }
    }

    fn step_in_row(&self, node: DrawerId, direction: Direction, wrap: bool) -> Option<DrawerId> {
        let owner = self.row_owner(node);
        let cells = self.row_cells(owner).unwrap_or_default();
        let target = match cells.iter().position(|&cell| self.is_ancestor_of(cell, node)) {
            Some(index) if direction == Direction::Right => cells.get(index + 1).copied(),
            Some(index) => index.checked_sub(1).map(|previous| cells[previous]),
            // The row owner itself: stepping right enters its first cell.
            None if direction == Direction::Right => cells.first().copied(),
            None => None,
        };
        if target.is_some() || !wrap {
            return target;
        }
        tracing::trace!(target: targets::NAVIGATION, ?node, ?direction, "wrapping to adjacent row");
        match direction {
            Direction::Right => self.down_from(owner, 0),
            _ => self.up_from(owner, usize::MAX),
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// The selected drawer, if it is still alive.
    pub fn selected(&self) -> Option<DrawerId> {
        self.selection.and_then(|handle| self.resolve(handle))
    }

    /// Select `id`, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<DrawerId>) -> InspectorResult<()> {
        if let Some(previous) = self.selected()
            && let Some(node) = self.nodes.get_mut(previous)
        {
            node.selected = false;
        }
        self.selection = None;
        if let Some(id) = id {
            let handle = self.handle(id)?;
            self.active_mut(id)?.selected = true;
            self.selection = Some(handle);
            self.preferred_column = self.column_of(id);
        }
        Ok(())
    }

    /// `id` when it and all of its ancestors are listed, otherwise the
    /// nearest ancestor that is displayed. `None` when even the root is not.
    fn displayed_anchor(&self, id: DrawerId) -> Option<DrawerId> {
        let mut chain = vec![id];
        while let Some(parent) = chain.last().and_then(|&last| self.nodes.get(last)?.parent) {
            chain.push(parent);
        }
        let mut anchor = None;
        for &drawer in chain.iter().rev() {
            if !self.nodes.get(drawer).is_some_and(DrawerNode::is_listed) {
                break;
            }
            anchor = Some(drawer);
        }
        anchor
    }

    /// Move the selection one step in `direction`.
    ///
    /// With nothing selected, the first visible root is selected (the last
    /// row when moving up). A selection hidden by folding or filtering moves
    /// to its nearest displayed ancestor, and that is the step. Up and Down
    /// keep the preferred column when
    /// [`remember_column`](crate::config::NavigationConfig::remember_column)
    /// is on. Returns the new selection, or `None` at a dead end, in which
    /// case the selection is unchanged.
    pub fn move_selection(
        &mut self,
        direction: Direction,
        wrap: bool,
    ) -> InspectorResult<Option<DrawerId>> {
        if let Some(current) = self.selected() {
            let anchor = self.displayed_anchor(current);
            if anchor != Some(current) {
                tracing::trace!(target: targets::NAVIGATION, ?current, ?anchor, "selection hidden, re-anchoring");
                self.select(anchor)?;
                if anchor.is_some() {
                    return Ok(anchor);
                }
            }
        }

        let Some(current) = self.selected() else {
            let target = match direction {
                Direction::Up => self
                    .visible_roots
                    .last()
                    .map(|&root| self.enter_from_below(root, 0)),
                _ => self.visible_roots.first().copied(),
            };
            self.select(target)?;
            return Ok(target);
        };

        let vertical = matches!(direction, Direction::Up | Direction::Down);
        let remember = vertical && self.config.navigation.remember_column;
        let column = if remember {
            self.preferred_column
        } else {
            self.column_of(current)
        };
        let Some(target) = self.next_wrapping(current, direction, column, wrap) else {
            tracing::trace!(target: targets::NAVIGATION, ?current, ?direction, "no drawer in that direction");
            return Ok(None);
        };

        let preferred = self.preferred_column;
        self.select(Some(target))?;
        if remember {
            self.preferred_column = preferred;
        }
        Ok(Some(target))
    }
}
