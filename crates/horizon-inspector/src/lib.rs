//! Horizon Inspector - a retained drawer tree for property inspectors.
//!
//! A [`DrawerTree`] mirrors the shape of an inspected object as a tree of
//! drawers: leaf editors for scalar fields and parents for composites, inline
//! rows and collections. The tree manages:
//!
//! - **Lifecycle**: pooled drawers acquired per [`DrawerKind`] and set up in
//!   two phases, with generations for stale-handle detection
//! - **Members**: lazy construction from a [`MemberResolver`] and the
//!   `members` / `visible_members` arrays with exactly-once
//!   [`VisibilityEvent`]s
//! - **Filtering**: search text or arbitrary [`DrawerPredicate`]s propagated
//!   up to ancestors
//! - **Folding**: time-driven [`FoldAnimation`]s advanced by
//!   [`DrawerTree::tick`]
//! - **Navigation**: keyboard focus movement across rows and inline cells
//! - **Reordering**: drop targets and collection edits through
//!   [`ReorderCoordinator`]
//!
//! # Example
//!
//! ```
//! use horizon_inspector::{DrawerKind, DrawerTree, MemberHandle, TypeTable};
//!
//! let types = TypeTable::new().with(
//!     "Light",
//!     vec![
//!         MemberHandle::new("Intensity", DrawerKind::Float).with_value(1.0),
//!         MemberHandle::new("Shadows", DrawerKind::Bool).with_value(true),
//!     ],
//! );
//! let mut tree = DrawerTree::new(types);
//! let light = tree.create_root(&MemberHandle::new("Light", DrawerKind::Composite).with_type("Light"))?;
//!
//! // Folded parents build nothing until they are opened.
//! assert!(tree.members(light)?.is_empty());
//! tree.set_unfolded(light, true)?;
//! assert_eq!(tree.visible_members(light)?.len(), 2);
//!
//! tree.set_search("shad")?;
//! assert_eq!(tree.visible_members(light)?.len(), 1);
//! # Ok::<(), horizon_inspector::DrawerError>(())
//! ```

pub mod config;
pub mod debug;
mod easing;
mod events;
mod filter;
mod fold;
mod kind;
mod member;
mod members;
mod navigation;
mod node;
pub mod prelude;
mod reorder;
mod tree;
mod value;

pub use horizon_inspector_core::*;

pub use config::{ConfigError, ConfigResult, InspectorConfig};
pub use easing::Easing;
pub use events::VisibilityEvent;
pub use filter::{DrawerPredicate, SearchFilter, SearchTerm};
pub use fold::{FoldAnimation, FoldState};
pub use kind::{DrawerKind, MemberLayout};
pub use member::{CachedResolver, MemberHandle, MemberKey, MemberResolver, TypeHandle, TypeTable};
pub use navigation::{Direction, Requester};
pub use node::{DrawerNode, HasChildren, HasSelection, IsReorderable, Lifecycle, ParentState};
pub use reorder::ReorderCoordinator;
pub use tree::DrawerTree;
pub use value::DrawerValue;
