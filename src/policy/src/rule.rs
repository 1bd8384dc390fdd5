//! Permission rules
//!
//! A rule pairs an [`EntityMatcher`] with exactly one check source: an
//! explicit closure, or the name of a method defined on the policy type.
//! Rules are immutable once built.

use crate::entity::EntityMatcher;
use crate::error::{CheckError, PolicyError, Result};
use crate::instance::PolicyInstance;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Outcome of a check: any JSON value, passed back to the caller unchanged
pub type CheckResult = std::result::Result<Value, CheckError>;

/// Executable check, evaluated against a policy instance
pub type Check<E, R> = Arc<dyn Fn(&PolicyInstance<'_, E, R>) -> CheckResult + Send + Sync>;

/// Wrap a closure as a [`Check`]
pub fn check<E, R, F>(f: F) -> Check<E, R>
where
    F: Fn(&PolicyInstance<'_, E, R>) -> CheckResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Where a rule's decision comes from
pub enum CheckSource<E, R> {
    /// Explicit check body
    Body(Check<E, R>),
    /// Named method, looked up on the policy type at evaluation time
    Method(String),
}

// Manual impls: the closure is shared, so E and R need not be Clone.
impl<E, R> Clone for CheckSource<E, R> {
    fn clone(&self) -> Self {
        match self {
            Self::Body(body) => Self::Body(Arc::clone(body)),
            Self::Method(name) => Self::Method(name.clone()),
        }
    }
}

impl<E, R> fmt::Debug for CheckSource<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body(_) => f.write_str("Body(<check>)"),
            Self::Method(name) => f.debug_tuple("Method").field(name).finish(),
        }
    }
}

/// Entity matcher plus the check it guards
pub struct PermissionRule<E, R> {
    matcher: EntityMatcher,
    source: CheckSource<E, R>,
}

impl<E, R> PermissionRule<E, R> {
    /// Build a rule from a check body or a method name
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Configuration`] unless exactly one of `body`
    /// and `method` is given, or if `method` is empty.
    pub fn new(
        matcher: EntityMatcher,
        body: Option<Check<E, R>>,
        method: Option<String>,
    ) -> Result<Self> {
        let source = match (body, method) {
            (Some(body), None) => CheckSource::Body(body),
            (None, Some(method)) if !method.is_empty() => CheckSource::Method(method),
            (None, Some(_)) => {
                return Err(PolicyError::configuration("method name cannot be empty"));
            }
            (None, None) => {
                return Err(PolicyError::configuration(
                    "a rule needs either a check body or a method name",
                ));
            }
            (Some(_), Some(method)) => {
                return Err(PolicyError::configuration(format!(
                    "a rule takes a check body or a method name, not both (method '{}')",
                    method
                )));
            }
        };

        Ok(Self { matcher, source })
    }

    pub fn matcher(&self) -> &EntityMatcher {
        &self.matcher
    }

    pub fn source(&self) -> &CheckSource<E, R> {
        &self.source
    }

    /// Evaluate the check with `instance` as its context
    ///
    /// The result is returned as produced by the check, not coerced.
    pub fn evaluate(&self, instance: &PolicyInstance<'_, E, R>) -> CheckResult {
        match &self.source {
            CheckSource::Body(body) => body(instance),
            CheckSource::Method(method) => instance.call(method),
        }
    }
}

impl<E, R> Clone for PermissionRule<E, R> {
    fn clone(&self) -> Self {
        Self {
            matcher: self.matcher,
            source: self.source.clone(),
        }
    }
}

impl<E, R> fmt::Debug for PermissionRule<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionRule")
            .field("matcher", &self.matcher)
            .field("source", &self.source)
            .finish()
    }
}
