//! Notifications emitted by the drawer tree.

use horizon_inspector_core::DrawerHandle;

/// A drawer entered or left its parent's visible members.
///
/// Fired exactly once per transition; rebuilding a visible list that did not
/// change emits nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityEvent {
    /// The drawer, with the generation it had when the event fired.
    pub handle: DrawerHandle,
    /// `true` for became-visible, `false` for became-invisible.
    pub visible: bool,
}
