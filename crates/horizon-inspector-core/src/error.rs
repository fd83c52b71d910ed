//! Error types for Horizon Inspector.
//!
//! Errors fall into two groups. Recoverable ones (an id that no longer exists,
//! a read-only drawer, a leaf asked for members) are plain `Err` values.
//! Structural violations (double release, mutating a pooled drawer, member
//! bookkeeping going out of sync) indicate a bug in the host; they are routed
//! through [`DrawerError::structural`], which panics in debug builds and
//! degrades to a logged no-op in release builds.

use crate::id::DrawerId;
use crate::logging::targets;

/// Result type alias for drawer tree operations.
pub type InspectorResult<T> = std::result::Result<T, DrawerError>;

/// Errors that can occur during drawer tree operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawerError {
    /// The id does not name a drawer in the arena.
    #[error("invalid or destroyed drawer id {0:?}")]
    InvalidDrawerId(DrawerId),

    /// The drawer is sitting in the pool and cannot be used.
    #[error("drawer {0:?} is pooled and cannot be mutated")]
    Pooled(DrawerId),

    /// The drawer was handed back to its pool a second time.
    #[error("drawer {0:?} was released to the pool twice")]
    DoubleRelease(DrawerId),

    /// A parent-only operation was called on a leaf drawer.
    #[error("drawer {0:?} is not a parent")]
    NotAParent(DrawerId),

    /// The drawer is not a member of the given parent.
    #[error("drawer {member:?} is not a member of {parent:?}")]
    NotAMember {
        /// The parent that was expected to own the member.
        parent: DrawerId,
        /// The drawer that is not owned by `parent`.
        member: DrawerId,
    },

    /// The drawer already belongs to another parent or the root list.
    #[error("drawer {0:?} is already attached elsewhere")]
    AlreadyAttached(DrawerId),

    /// The same drawer appears twice in one member array.
    #[error("drawer {0:?} appears more than once in a member array")]
    DuplicateMember(DrawerId),

    /// A parent would become a member of its own subtree.
    #[error("drawer {0:?} cannot be a member of its own subtree")]
    CircularMembership(DrawerId),

    /// Member construction did not produce one drawer per build-list entry.
    #[error("built {actual} members for {parent:?} from a build list of {expected}")]
    MemberCountMismatch {
        /// The parent whose members were built.
        parent: DrawerId,
        /// Number of build-list entries.
        expected: usize,
        /// Number of drawers constructed.
        actual: usize,
    },

    /// An insertion or move index is past the end of the member array.
    #[error("index {index} is out of range for {len} members")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The member count at the time of the call.
        len: usize,
    },

    /// A user edit targeted a read-only drawer.
    #[error("drawer {0:?} is read-only")]
    ReadOnly(DrawerId),

    /// A value of the wrong shape was assigned to a drawer.
    #[error("drawer {id:?} of kind {kind} cannot hold this value")]
    ValueMismatch {
        /// The drawer that rejected the value.
        id: DrawerId,
        /// The drawer kind's name.
        kind: &'static str,
    },

    /// The member cannot be reordered.
    #[error("drawer {0:?} cannot be reordered")]
    NotReorderable(DrawerId),
}

impl DrawerError {
    /// Whether this error indicates a bug in the host rather than a
    /// recoverable condition.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Pooled(_)
                | Self::DoubleRelease(_)
                | Self::AlreadyAttached(_)
                | Self::DuplicateMember(_)
                | Self::CircularMembership(_)
                | Self::MemberCountMismatch { .. }
        )
    }

    /// Report a structural violation.
    ///
    /// Logs the violation, then panics when debug assertions are enabled.
    /// In release builds the error is returned so the caller can bail out
    /// without touching the tree.
    #[track_caller]
    pub fn structural(self) -> Self {
        tracing::error!(target: targets::TREE, error = %self, "structural violation");
        if cfg!(debug_assertions) {
            panic!("structural violation: {self}");
        }
        self
    }
}
