//! Concrete drawer kinds.
//!
//! The kind is fixed when a drawer is allocated and is part of its identity:
//! pools are keyed by it, and capability checks read it instead of probing
//! the value at every access.

use std::fmt;

use crate::value::DrawerValue;

/// How a parent arranges its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberLayout {
    /// One row per member, below the parent's own header row.
    Vertical,
    /// All members side by side in a single row (e.g. the x/y/z fields of a
    /// vector).
    Horizontal,
}

/// The concrete kind of a drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DrawerKind {
    /// A boolean field.
    Bool,
    /// An integer field.
    Integer,
    /// A floating point field.
    Float,
    /// A text field.
    Text,
    /// A reference to another object, possibly empty.
    Reference,
    /// The "add element" control at the end of a collection.
    AddButton,
    /// A class or struct shown as a foldable list of member rows.
    Composite,
    /// A small struct shown with its members side by side in one row.
    Inline,
    /// An ordered, reorderable collection of elements.
    Collection,
}

impl DrawerKind {
    /// Every kind, in declaration order.
    pub const ALL: [DrawerKind; 9] = [
        Self::Bool,
        Self::Integer,
        Self::Float,
        Self::Text,
        Self::Reference,
        Self::AddButton,
        Self::Composite,
        Self::Inline,
        Self::Collection,
    ];

    /// Whether drawers of this kind own members.
    #[inline]
    pub fn is_parent(self) -> bool {
        matches!(self, Self::Composite | Self::Inline | Self::Collection)
    }

    /// How members are arranged. Leaves report `Vertical`.
    #[inline]
    pub fn layout(self) -> MemberLayout {
        match self {
            Self::Inline => MemberLayout::Horizontal,
            _ => MemberLayout::Vertical,
        }
    }

    /// Whether the user can fold and unfold this drawer.
    #[inline]
    pub fn is_foldable(self) -> bool {
        matches!(self, Self::Composite | Self::Collection)
    }

    /// Whether drawers of this kind start out unfolded.
    #[inline]
    pub fn starts_unfolded(self) -> bool {
        matches!(self, Self::Inline)
    }

    /// Whether members of this kind can be dragged into a new order.
    #[inline]
    pub fn is_reorderable(self) -> bool {
        matches!(self, Self::Collection)
    }

    /// Auxiliary controls stay visible while their parent is folded and are
    /// suppressed while a filter is active.
    #[inline]
    pub fn is_auxiliary(self) -> bool {
        matches!(self, Self::AddButton)
    }

    /// A short, stable name used for type matching and debugging.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Text => "Text",
            Self::Reference => "Reference",
            Self::AddButton => "AddButton",
            Self::Composite => "Composite",
            Self::Inline => "Inline",
            Self::Collection => "Collection",
        }
    }

    /// Whether a drawer of this kind can hold `value`.
    pub fn accepts(self, value: &DrawerValue) -> bool {
        match (self, value) {
            (_, DrawerValue::None) => true,
            (Self::Bool, DrawerValue::Bool(_)) => true,
            (Self::Integer, DrawerValue::Integer(_)) => true,
            (Self::Float, DrawerValue::Float(_)) => true,
            (Self::Text, DrawerValue::Text(_)) => true,
            (Self::Reference, DrawerValue::Reference(_)) => true,
            (Self::Collection, DrawerValue::Elements(_)) => true,
            (Self::Composite | Self::Inline, DrawerValue::Text(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for DrawerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_kinds() {
        let parents: Vec<_> = DrawerKind::ALL.into_iter().filter(|k| k.is_parent()).collect();
        assert_eq!(
            parents,
            vec![DrawerKind::Composite, DrawerKind::Inline, DrawerKind::Collection]
        );
    }

    #[test]
    fn test_capabilities() {
        assert_eq!(DrawerKind::Inline.layout(), MemberLayout::Horizontal);
        assert_eq!(DrawerKind::Composite.layout(), MemberLayout::Vertical);
        assert!(DrawerKind::Inline.starts_unfolded());
        assert!(!DrawerKind::Inline.is_foldable());
        assert!(DrawerKind::Collection.is_reorderable());
        assert!(!DrawerKind::Composite.is_reorderable());
        assert!(DrawerKind::AddButton.is_auxiliary());
    }

    #[test]
    fn test_accepts() {
        assert!(DrawerKind::Bool.accepts(&DrawerValue::Bool(true)));
        assert!(DrawerKind::Bool.accepts(&DrawerValue::None));
        assert!(!DrawerKind::Bool.accepts(&DrawerValue::Integer(1)));
        assert!(DrawerKind::Collection.accepts(&DrawerValue::Elements(3)));
    }
}
