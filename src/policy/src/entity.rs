//! Entity kinds and rule matchers
//!
//! Entities are the subjects being authorized. Each entity reports a static
//! [`EntityKind`]; kinds form a single-parent hierarchy so that a rule
//! registered for `User` also applies to an `Admin` declared as extending it.
//!
//! A kind's identity is the address of its `static`, not its name: two
//! statics named `User` in different modules are unrelated kinds. Always
//! declare kinds as `static` items, never `const`.
//!
//! ```rust
//! use cretoai_policy::entity::{EntityKind, EntityMatcher};
//!
//! static USER: EntityKind = EntityKind::root("User");
//! static ADMIN: EntityKind = EntityKind::extends("Admin", &USER);
//!
//! assert!(ADMIN.is_a(&USER));
//! assert!(EntityMatcher::from(&USER).matches(&ADMIN));
//! assert!(EntityMatcher::Any.matches(&USER));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Static descriptor of an entity's runtime type
#[derive(Debug)]
pub struct EntityKind {
    name: &'static str,
    parent: Option<&'static EntityKind>,
}

impl EntityKind {
    /// Declare a kind with no parent
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// Declare a kind that is a subtype of `parent`
    pub const fn extends(name: &'static str, parent: &'static EntityKind) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<&'static EntityKind> {
        self.parent
    }

    /// This kind followed by each of its ancestors, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = &EntityKind> {
        std::iter::successors(Some(self), |kind| kind.parent.map(|p| p as &EntityKind))
    }

    /// Whether this kind is `other` or a subtype of it
    pub fn is_a(&self, other: &EntityKind) -> bool {
        self.ancestors().any(|kind| kind == other)
    }
}

impl PartialEq for EntityKind {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for EntityKind {}

impl Hash for EntityKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self, state);
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Subject of an authorization check
pub trait Entity {
    /// Runtime kind used for rule matching
    fn kind(&self) -> &'static EntityKind;
}

impl<T: Entity + ?Sized> Entity for &T {
    fn kind(&self) -> &'static EntityKind {
        (**self).kind()
    }
}

impl<T: Entity + ?Sized> Entity for Box<T> {
    fn kind(&self) -> &'static EntityKind {
        (**self).kind()
    }
}

impl<T: Entity + ?Sized> Entity for Arc<T> {
    fn kind(&self) -> &'static EntityKind {
        (**self).kind()
    }
}

/// Entity-type constraint on a permission rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityMatcher {
    /// Catch-all, matches every entity
    Any,
    /// Matches the kind and any of its subtypes
    Kind(&'static EntityKind),
}

impl EntityMatcher {
    /// Check if an entity of `kind` satisfies this matcher
    pub fn matches(&self, kind: &EntityKind) -> bool {
        match self {
            Self::Any => true,
            Self::Kind(expected) => kind.is_a(expected),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl Default for EntityMatcher {
    fn default() -> Self {
        Self::Any
    }
}

impl From<&'static EntityKind> for EntityMatcher {
    fn from(kind: &'static EntityKind) -> Self {
        Self::Kind(kind)
    }
}

impl From<Option<&'static EntityKind>> for EntityMatcher {
    fn from(kind: Option<&'static EntityKind>) -> Self {
        kind.map_or(Self::Any, Self::Kind)
    }
}

impl fmt::Display for EntityMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Kind(kind) => write!(f, "{}", kind),
        }
    }
}
