//! Scope value object
//!
//! A [`Scope`] carries the collection of records an entity may list. By
//! default it resolves to the collection unchanged; filtering is supplied by
//! implementing [`ScopeResolver`].
//!
//! ```rust
//! use cretoai_policy::scope::{Scope, ScopeResolver};
//!
//! struct OwnedBy;
//!
//! type Posts = Vec<(u32, &'static str)>;
//!
//! impl ScopeResolver<Posts, u32> for OwnedBy {
//!     fn resolve(&self, scope: Posts, entity: Option<&u32>) -> Posts {
//!         scope.into_iter().filter(|(owner, _)| Some(owner) == entity).collect()
//!     }
//! }
//!
//! let posts = vec![(1, "draft"), (2, "notes")];
//! assert_eq!(Scope::new(posts.clone(), Some(1)).resolve(), &posts);
//! assert_eq!(Scope::new(posts, Some(1)).resolve_with(&OwnedBy), vec![(1, "draft")]);
//! ```

/// Filtering strategy applied by [`Scope::resolve_with`]
pub trait ScopeResolver<C, E> {
    fn resolve(&self, scope: C, entity: Option<&E>) -> C;
}

/// Resolver that returns the collection verbatim
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl<C, E> ScopeResolver<C, E> for IdentityResolver {
    fn resolve(&self, scope: C, _entity: Option<&E>) -> C {
        scope
    }
}

/// Collection of records paired with the acting entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope<C, E> {
    scope: C,
    entity: Option<E>,
}

impl<C, E> Scope<C, E> {
    pub fn new(scope: C, entity: Option<E>) -> Self {
        Self { scope, entity }
    }

    pub fn scope(&self) -> &C {
        &self.scope
    }

    pub fn entity(&self) -> Option<&E> {
        self.entity.as_ref()
    }

    /// The collection, unfiltered
    pub fn resolve(&self) -> &C {
        &self.scope
    }

    /// Apply `resolver` to the collection and the acting entity
    pub fn resolve_with<S: ScopeResolver<C, E>>(self, resolver: &S) -> C {
        resolver.resolve(self.scope, self.entity.as_ref())
    }
}
