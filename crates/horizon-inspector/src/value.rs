//! Cached drawer values.
//!
//! The tree stores a type-erased snapshot of the inspected data so it can
//! match filter terms and detect shape changes without calling back into the
//! host. Leaf drawers hold a concrete scalar; collections hold their length.

use std::fmt;

/// A cached value held by a drawer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DrawerValue {
    /// No value, the state of a pooled or freshly acquired drawer.
    #[default]
    None,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// Text, or the summary text of a composite.
    Text(String),
    /// A reference to another object by display name; `None` when empty.
    Reference(Option<String>),
    /// The element count of a collection.
    Elements(usize),
}

impl DrawerValue {
    /// Whether this is [`DrawerValue::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Whether the value's display text contains `needle`.
    ///
    /// `needle` must already be lowercased when `case_sensitive` is false.
    pub fn display_contains(&self, needle: &str, case_sensitive: bool) -> bool {
        let text = self.to_string();
        if case_sensitive {
            text.contains(needle)
        } else {
            text.to_lowercase().contains(needle)
        }
    }
}

impl fmt::Display for DrawerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
            Self::Reference(Some(name)) => f.write_str(name),
            Self::Reference(None) => f.write_str("None"),
            Self::Elements(count) => write!(f, "{count}"),
        }
    }
}

impl From<bool> for DrawerValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for DrawerValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for DrawerValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for DrawerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DrawerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
