//! Logging facilities for Horizon Inspector.
//!
//! Horizon Inspector uses the `tracing` crate for instrumentation. To see
//! logs, install a subscriber in the host application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_inspector=trace")
//!     .init();
//! ```
//!
//! Every subsystem logs under one of the [`targets`] so hosts can filter,
//! for example, just the filter propagator or just pool traffic.

/// Target names for log filtering.
pub mod targets {
    /// Drawer pool traffic.
    pub const POOL: &str = "horizon_inspector::pool";
    /// Drawer lifecycle and structural checks.
    pub const TREE: &str = "horizon_inspector::tree";
    /// Member construction and member-array replacement.
    pub const MEMBERS: &str = "horizon_inspector::members";
    /// Filter propagation.
    pub const FILTER: &str = "horizon_inspector::filter";
    /// Fold animation.
    pub const FOLD: &str = "horizon_inspector::fold";
    /// Keyboard navigation.
    pub const NAVIGATION: &str = "horizon_inspector::navigation";
    /// Reordering of collection members.
    pub const REORDER: &str = "horizon_inspector::reorder";
    /// Signal emission.
    pub const SIGNAL: &str = "horizon_inspector::signal";
    /// Configuration loading.
    pub const CONFIG: &str = "horizon_inspector::config";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Wrap expensive operations (member resolution, filter passes) in one so
/// profilers can time them.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_inspector::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
