//! Core systems for Horizon Inspector.
//!
//! This crate provides the domain-independent building blocks of the
//! inspector's drawer tree:
//!
//! - **Identity**: [`DrawerId`] arena keys, [`Generation`] reuse counters and
//!   [`DrawerHandle`] for staleness checks
//! - **Pooling**: [`NodePool`], per-kind free-lists of recycled drawers
//! - **Errors**: [`DrawerError`] and the structural-violation policy
//! - **Geometry**: [`Point`], [`Size`] and [`Rect`] for last-drawn bounds
//! - **Signals**: [`Signal`] for synchronous change notification
//! - **Logging**: tracing targets and [`PerfSpan`]
//!
//! # Staleness Example
//!
//! ```
//! use horizon_inspector_core::{DrawerHandle, Generation};
//! # use slotmap::SlotMap;
//! # let mut arena: SlotMap<horizon_inspector_core::DrawerId, ()> = SlotMap::with_key();
//! # let id = arena.insert(());
//!
//! let captured = DrawerHandle::new(id, Generation::FIRST);
//! // ... the drawer is disposed and reused ...
//! let live = DrawerHandle::new(id, Generation::FIRST.next());
//! assert_ne!(captured, live);
//! ```

mod error;
pub mod geometry;
mod id;
pub mod logging;
pub mod pool;
pub mod signal;

pub use error::{DrawerError, InspectorResult};
pub use geometry::{Point, Rect, Size};
pub use id::{DrawerHandle, DrawerId, Generation};
pub use logging::PerfSpan;
pub use pool::{NodePool, PoolStats, Release};
pub use signal::{ConnectionId, Signal};
