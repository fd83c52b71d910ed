//! Fold animation state machine.
//!
//! Each parent owns a [`FoldAnimation`]: the user's target plus an
//! `unfoldedness` in `[0, 1]` that moves linearly toward it on every
//! [`DrawerTree::tick`]. Members stay listed while the parent is
//! potentially visible (target unfolded, or still partly open), so a folding
//! parent keeps drawing its members until the animation reaches zero.

use std::time::Duration;

use horizon_inspector_core::logging::targets;
use horizon_inspector_core::{DrawerId, InspectorResult};

use crate::easing::Easing;
use crate::kind::DrawerKind;
use crate::node::HasChildren;
use crate::tree::DrawerTree;

/// Discrete fold state derived from a [`FoldAnimation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldState {
    /// Fully closed and not opening.
    Folded,
    /// Moving toward the target, or about to.
    Animating,
    /// Fully open and not closing.
    Unfolded,
}

/// Target and progress of a parent's fold animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldAnimation {
    target: bool,
    unfoldedness: f32,
}

impl Default for FoldAnimation {
    fn default() -> Self {
        Self::FOLDED
    }
}

impl FoldAnimation {
    /// Settled closed.
    pub const FOLDED: Self = Self {
        target: false,
        unfoldedness: 0.0,
    };

    /// Settled open.
    pub const UNFOLDED: Self = Self {
        target: true,
        unfoldedness: 1.0,
    };

    /// The initial state for a parent of `kind`.
    pub fn for_kind(kind: DrawerKind) -> Self {
        if kind.starts_unfolded() {
            Self::UNFOLDED
        } else {
            Self::FOLDED
        }
    }

    /// The user's intended state.
    #[inline]
    pub fn target(&self) -> bool {
        self.target
    }

    /// Linear progress, exactly `0.0` or `1.0` at the endpoints.
    #[inline]
    pub fn unfoldedness(&self) -> f32 {
        self.unfoldedness
    }

    fn end(&self) -> f32 {
        if self.target { 1.0 } else { 0.0 }
    }

    /// Whether progress has reached the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.unfoldedness == self.end()
    }

    /// Discrete state. A parent whose target differs from where it rests is
    /// already `Animating`, even before the first tick.
    pub fn state(&self) -> FoldState {
        match (self.is_settled(), self.target) {
            (true, true) => FoldState::Unfolded,
            (true, false) => FoldState::Folded,
            (false, _) => FoldState::Animating,
        }
    }

    /// Whether members may be drawn at all.
    #[inline]
    pub fn is_potentially_visible(&self) -> bool {
        self.target || self.unfoldedness > 0.0
    }

    /// Set the target. Returns whether it changed.
    pub fn set_target(&mut self, target: bool) -> bool {
        let changed = self.target != target;
        self.target = target;
        changed
    }

    /// Move `step` (a fraction of the full animation) toward the target.
    /// Returns `true` once settled.
    pub fn advance(&mut self, step: f32) -> bool {
        let step = step.max(0.0);
        self.unfoldedness = if self.target {
            (self.unfoldedness + step).min(1.0)
        } else {
            (self.unfoldedness - step).max(0.0)
        };
        self.is_settled()
    }

    /// Jump to the target.
    pub fn snap(&mut self) {
        self.unfoldedness = self.end();
    }

    /// Eased progress for drawing.
    pub fn eased(&self, easing: Easing) -> f32 {
        easing.apply(self.unfoldedness)
    }
}

impl DrawerTree {
    /// Set whether `id` should be unfolded.
    ///
    /// Unfolding constructs the members on first use so they can be drawn
    /// while the animation runs. Folding keeps the members; they leave the
    /// visible list once the animation reaches zero. Non-foldable parents
    /// ignore the call.
    pub fn set_unfolded(&mut self, id: DrawerId, unfolded: bool) -> InspectorResult<()> {
        let handle = self.handle(id)?;
        let duration = self.config.fold.duration();
        let kind = self.active(id)?.kind;
        let state = self.parent_state_mut(id)?;
        if !kind.is_foldable() {
            tracing::trace!(target: targets::FOLD, ?id, %kind, "ignoring fold toggle on non-foldable drawer");
            return Ok(());
        }
        if !state.fold.set_target(unfolded) {
            return Ok(());
        }

        if duration.is_zero() {
            state.fold.snap();
        }
        let settled = state.fold.is_settled();
        if !settled && !self.animating.contains(&handle) {
            self.animating.push(handle);
        }
        tracing::trace!(target: targets::FOLD, ?id, unfolded, "fold target changed");

        if unfolded {
            self.ensure_members_built(id)?;
        }
        self.rebuild_visible_members(id, true)
    }

    /// Set the fold target of `id` and of every already-built parent below
    /// it. Members that were never constructed are left alone.
    pub fn set_unfolded_recursive(&mut self, id: DrawerId, unfolded: bool) -> InspectorResult<()> {
        self.set_unfolded(id, unfolded)?;
        let count = self.parent_state(id)?.members.len();
        for index in 0..count {
            let member = self.parent_state(id)?.members[index];
            let built = self
                .nodes
                .get(member)
                .and_then(|node| node.as_parent())
                .is_some_and(|state| state.is_built());
            if built {
                self.set_unfolded_recursive(member, unfolded)?;
            }
        }
        Ok(())
    }

    /// Flip the fold target of `id`.
    pub fn toggle_unfolded(&mut self, id: DrawerId) -> InspectorResult<()> {
        let unfolded = self.parent_state(id)?.fold.target();
        self.set_unfolded(id, !unfolded)
    }

    /// Advance every running fold animation by `delta`.
    ///
    /// Only parents that are animating are visited. Returns how many are
    /// still animating afterwards.
    pub fn tick(&mut self, delta: Duration) -> InspectorResult<usize> {
        if self.animating.is_empty() {
            return Ok(0);
        }
        let duration = self.config.fold.duration();
        let step = if duration.is_zero() {
            1.0
        } else {
            delta.as_secs_f32() / duration.as_secs_f32()
        };

        let mut running = std::mem::take(&mut self.animating);
        let mut folded = Vec::new();
        running.retain(|&handle| {
            let Some(id) = self.resolve(handle) else {
                return false;
            };
            let Some(state) = self.nodes.get_mut(id).and_then(|node| node.parent_state_mut()) else {
                return false;
            };
            if !state.fold.advance(step) {
                return true;
            }
            if state.fold.state() == FoldState::Folded {
                folded.push(id);
            }
            false
        });
        self.animating = running;

        for id in folded {
            tracing::trace!(target: targets::FOLD, ?id, "fold animation finished");
            self.rebuild_visible_members(id, true)?;
        }
        Ok(self.animating.len())
    }

    /// Whether any fold animation is running.
    pub fn is_animating(&self) -> bool {
        !self.animating.is_empty()
    }

    /// Discrete fold state of `id`.
    pub fn fold_state(&self, id: DrawerId) -> InspectorResult<FoldState> {
        Ok(self.parent_state(id)?.fold.state())
    }

    /// Whether the user wants `id` unfolded.
    pub fn is_unfolded(&self, id: DrawerId) -> InspectorResult<bool> {
        Ok(self.parent_state(id)?.fold.target())
    }

    /// Linear fold progress of `id`.
    pub fn unfoldedness(&self, id: DrawerId) -> InspectorResult<f32> {
        Ok(self.parent_state(id)?.fold.unfoldedness())
    }

    /// Eased fold progress of `id`, for drawing.
    pub fn display_unfoldedness(&self, id: DrawerId) -> InspectorResult<f32> {
        Ok(self.parent_state(id)?.fold.eased(self.config.fold.easing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InspectorConfig;
    use crate::member::{MemberHandle, TypeTable};

    #[test]
    fn test_initial_state() {
        assert_eq!(FoldAnimation::for_kind(DrawerKind::Composite).state(), FoldState::Folded);
        assert_eq!(FoldAnimation::for_kind(DrawerKind::Inline).state(), FoldState::Unfolded);
    }

    #[test]
    fn test_target_change_enters_animating() {
        let mut fold = FoldAnimation::FOLDED;
        assert!(fold.set_target(true));
        assert!(!fold.set_target(true));
        assert_eq!(fold.state(), FoldState::Animating);
        assert_eq!(fold.unfoldedness(), 0.0);
        assert!(fold.is_potentially_visible());
    }

    #[test]
    fn test_advance_reaches_endpoints_exactly() {
        let mut fold = FoldAnimation::FOLDED;
        fold.set_target(true);
        assert!(!fold.advance(0.3));
        assert!(!fold.advance(0.3));
        assert!(!fold.advance(0.3));
        assert!(fold.advance(0.3));
        assert_eq!(fold.unfoldedness(), 1.0);
        assert_eq!(fold.state(), FoldState::Unfolded);

        fold.set_target(false);
        assert!(fold.is_potentially_visible());
        while !fold.advance(0.25) {}
        assert_eq!(fold.unfoldedness(), 0.0);
        assert_eq!(fold.state(), FoldState::Folded);
        assert!(!fold.is_potentially_visible());
    }

    #[test]
    fn test_reverse_mid_animation() {
        let mut fold = FoldAnimation::FOLDED;
        fold.set_target(true);
        fold.advance(0.5);
        fold.set_target(false);
        assert_eq!(fold.state(), FoldState::Animating);
        assert!(fold.advance(0.5));
        assert_eq!(fold.state(), FoldState::Folded);
    }

    #[test]
    fn test_snap() {
        let mut fold = FoldAnimation::FOLDED;
        fold.set_target(true);
        fold.snap();
        assert_eq!(fold, FoldAnimation::UNFOLDED);
    }

    fn rig() -> (DrawerTree, DrawerId) {
        let types = TypeTable::new()
            .with(
                "Camera",
                vec![
                    MemberHandle::new("Lens", DrawerKind::Composite).with_type("Lens"),
                    MemberHandle::new("Rig", DrawerKind::Composite).with_type("Rig"),
                    MemberHandle::new("Offset", DrawerKind::Inline).with_type("Lens"),
                ],
            )
            .with("Lens", vec![MemberHandle::new("Aperture", DrawerKind::Float)])
            .with("Rig", vec![MemberHandle::new("Height", DrawerKind::Float)]);
        let mut config = InspectorConfig::default();
        config.fold.duration_ms = 0;
        let mut tree = DrawerTree::with_config(types, config);
        let camera = tree
            .create_root(&MemberHandle::new("Camera", DrawerKind::Composite).with_type("Camera"))
            .unwrap();
        (tree, camera)
    }

    #[test]
    fn test_recursive_fold_reaches_built_parents_only() {
        let (mut tree, camera) = rig();
        tree.set_unfolded(camera, true).unwrap();
        let members = tree.members(camera).unwrap().to_vec();
        let (lens, rig) = (members[0], members[1]);
        tree.set_unfolded(lens, true).unwrap();
        tree.set_unfolded(lens, false).unwrap();
        tree.set_unfolded(camera, false).unwrap();

        tree.set_unfolded_recursive(camera, true).unwrap();
        assert_eq!(tree.fold_state(camera).unwrap(), FoldState::Unfolded);
        assert_eq!(tree.fold_state(lens).unwrap(), FoldState::Unfolded);
        assert_eq!(tree.visible_members(lens).unwrap().len(), 1);
        assert!(!tree.is_unfolded(rig).unwrap());
        assert!(tree.members(rig).unwrap().is_empty());

        tree.set_unfolded_recursive(camera, false).unwrap();
        assert!(!tree.is_unfolded(camera).unwrap());
        assert!(!tree.is_unfolded(lens).unwrap());
        assert_eq!(tree.members(lens).unwrap().len(), 1);
        assert!(tree.visible_members(lens).unwrap().is_empty());
        assert!(tree.members(rig).unwrap().is_empty());
    }

    #[test]
    fn test_toggle_unfolded() {
        let (mut tree, camera) = rig();
        tree.toggle_unfolded(camera).unwrap();
        assert!(tree.is_unfolded(camera).unwrap());
        assert_eq!(tree.visible_members(camera).unwrap().len(), 3);
        tree.toggle_unfolded(camera).unwrap();
        assert!(!tree.is_unfolded(camera).unwrap());
        assert!(tree.visible_members(camera).unwrap().is_empty());

        // Inline parents cannot be folded.
        tree.set_unfolded(camera, true).unwrap();
        let offset = tree.members(camera).unwrap()[2];
        tree.toggle_unfolded(offset).unwrap();
        assert_eq!(tree.fold_state(offset).unwrap(), FoldState::Unfolded);
    }
}
