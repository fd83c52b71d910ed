//! Prelude module for Horizon Inspector.
//!
//! ```
//! use horizon_inspector::prelude::*;
//! ```

// ============================================================================
// Tree
// ============================================================================

pub use crate::tree::DrawerTree;
pub use crate::node::{DrawerNode, HasChildren, HasSelection, IsReorderable};
pub use horizon_inspector_core::{DrawerError, DrawerHandle, DrawerId, InspectorResult};

// ============================================================================
// Members
// ============================================================================

pub use crate::kind::DrawerKind;
pub use crate::member::{MemberHandle, MemberResolver, TypeHandle, TypeTable};
pub use crate::value::DrawerValue;

// ============================================================================
// Behavior
// ============================================================================

pub use crate::filter::{DrawerPredicate, SearchFilter};
pub use crate::fold::FoldState;
pub use crate::navigation::{Direction, Requester};
pub use crate::reorder::ReorderCoordinator;
pub use crate::events::VisibilityEvent;
pub use crate::config::InspectorConfig;
