//! The member-resolver contract and its cache.
//!
//! Resolving the members of a type is the one expensive operation the tree
//! performs (it usually involves reflection in the host). The tree calls a
//! [`MemberResolver`] lazily, once per parent, and the [`CachedResolver`]
//! wrapper bounds the cost further to once per distinct type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use horizon_inspector_core::logging::targets;

use crate::kind::DrawerKind;
use crate::value::DrawerValue;

/// Opaque identifier of an inspected type, as understood by the resolver.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHandle(Arc<str>);

impl TypeHandle {
    /// Create a type handle from its name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The type's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle({})", self.0)
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeHandle {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Stable identity of a member within its parent (a field name, or an
/// element index for collections).
///
/// Rebuilding a parent reuses the existing drawer for every key that is
/// still present.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberKey(Arc<str>);

impl MemberKey {
    /// Create a key.
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    /// The key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberKey({})", self.0)
    }
}

impl From<&str> for MemberKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// One entry of a parent's member build list.
///
/// The tree passes it through unchanged into child setup; only `kind` and
/// `key` carry meaning for the tree itself.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberHandle {
    /// Identity within the parent.
    pub key: MemberKey,
    /// Concrete drawer kind to construct.
    pub kind: DrawerKind,
    /// Display name.
    pub label: String,
    /// Initial cached value.
    pub value: DrawerValue,
    /// Type whose members a parent drawer shows. `None` for leaves.
    pub type_handle: Option<TypeHandle>,
    /// Whether user edits are rejected.
    pub read_only: bool,
}

impl MemberHandle {
    /// Create a handle whose key and label are both `name`.
    pub fn new(name: impl Into<String>, kind: DrawerKind) -> Self {
        let label = name.into();
        Self {
            key: MemberKey::new(&label),
            kind,
            label,
            value: DrawerValue::None,
            type_handle: None,
            read_only: false,
        }
    }

    /// Use a key that differs from the label.
    pub fn with_key(mut self, key: impl Into<MemberKey>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the initial value.
    pub fn with_value(mut self, value: impl Into<DrawerValue>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the type whose members this drawer shows.
    pub fn with_type(mut self, type_handle: impl Into<TypeHandle>) -> Self {
        self.type_handle = Some(type_handle.into());
        self
    }

    /// Mark the member read-only.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Produces the ordered member build list of a type.
///
/// Returning `None` (or an empty list) means the type has no members; the
/// parent then simply has no children.
pub trait MemberResolver {
    /// Resolve the members of `owner`.
    fn resolve_members(&mut self, owner: &TypeHandle) -> Option<Vec<MemberHandle>>;

    /// Forget anything cached about `owner`. Called when the shape of a
    /// value of that type changed (for example a collection was resized).
    fn invalidate(&mut self, _owner: &TypeHandle) {}
}

impl<F> MemberResolver for F
where
    F: FnMut(&TypeHandle) -> Option<Vec<MemberHandle>>,
{
    fn resolve_members(&mut self, owner: &TypeHandle) -> Option<Vec<MemberHandle>> {
        self(owner)
    }
}

/// Memoizes another resolver per [`TypeHandle`].
#[derive(Debug)]
pub struct CachedResolver<R> {
    inner: R,
    cache: HashMap<TypeHandle, Option<Vec<MemberHandle>>>,
    misses: usize,
}

impl<R: MemberResolver> CachedResolver<R> {
    /// Wrap `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: HashMap::new(),
            misses: 0,
        }
    }

    /// How many times the wrapped resolver was actually called.
    pub fn resolve_count(&self) -> usize {
        self.misses
    }

    /// Number of types currently cached.
    pub fn cached_types(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached entry.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// The wrapped resolver.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// The wrapped resolver, mutably. Callers that change what it returns
    /// must [`invalidate`](MemberResolver::invalidate) affected types.
    pub fn inner_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

impl<R: MemberResolver> MemberResolver for CachedResolver<R> {
    fn resolve_members(&mut self, owner: &TypeHandle) -> Option<Vec<MemberHandle>> {
        if let Some(cached) = self.cache.get(owner) {
            return cached.clone();
        }
        self.misses += 1;
        tracing::trace!(target: targets::MEMBERS, type_handle = %owner, "resolving members");
        let resolved = self.inner.resolve_members(owner);
        self.cache.insert(owner.clone(), resolved.clone());
        resolved
    }

    fn invalidate(&mut self, owner: &TypeHandle) {
        if self.cache.remove(owner).is_some() {
            tracing::trace!(target: targets::MEMBERS, type_handle = %owner, "invalidated cached members");
        }
        self.inner.invalidate(owner);
    }
}

/// An in-memory resolver mapping type names to fixed build lists.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: HashMap<TypeHandle, Vec<MemberHandle>>,
}

impl TypeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the members of `owner`.
    pub fn insert(&mut self, owner: impl Into<TypeHandle>, members: Vec<MemberHandle>) {
        self.types.insert(owner.into(), members);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, owner: impl Into<TypeHandle>, members: Vec<MemberHandle>) -> Self {
        self.insert(owner, members);
        self
    }

    /// Remove a type.
    pub fn remove(&mut self, owner: &TypeHandle) -> Option<Vec<MemberHandle>> {
        self.types.remove(owner)
    }
}

impl MemberResolver for TypeTable {
    fn resolve_members(&mut self, owner: &TypeHandle) -> Option<Vec<MemberHandle>> {
        self.types.get(owner).cloned()
    }
}
