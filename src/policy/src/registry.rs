//! Policy type registry
//!
//! Each policy type owns a table mapping authorization types to an ordered
//! sequence of [`PermissionRule`]s, plus the named methods its rules may
//! delegate to. Registration happens while the [`PolicyType`] is mutable;
//! [`PolicyType::seal`] then freezes it into a [`SealedPolicy`] that can be
//! shared across threads and used to build policy instances.
//!
//! # Lifecycle
//!
//! ```text
//! PolicyType::new ──register──► PolicyType ──seal──► SealedPolicy ──instance──► PolicyInstance
//!                                    │                     │
//!                                    └──── specialize ─────┴──► PolicyType (snapshot)
//! ```
//!
//! Specializing deep-copies every rule sequence, so later registrations on
//! the parent and on the child never affect each other.
//!
//! # Example
//!
//! ```rust
//! use cretoai_policy::{EntityKind, PolicyType};
//! use serde_json::Value;
//!
//! static USER: EntityKind = EntityKind::root("User");
//!
//! # fn main() -> cretoai_policy::Result<()> {
//! let mut posts = PolicyType::<(), ()>::new("PostPolicy");
//! posts.permission("can_edit").entity(&USER).with("is_owner").register()?;
//! posts.permission("can_view").check(|_| Ok(Value::Bool(true))).register()?;
//!
//! let admin_posts = posts.specialize("AdminPostPolicy");
//! assert!(admin_posts.defines("can_edit"));
//! assert_eq!(admin_posts.parent(), Some("PostPolicy"));
//! # Ok(())
//! # }
//! ```

use crate::config::{DuplicateRulePolicy, RegistryConfig};
use crate::entity::{EntityKind, EntityMatcher};
use crate::error::{PolicyError, Result};
use crate::instance::PolicyInstance;
use crate::rule::{check, Check, CheckResult, PermissionRule};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Mutable rule registry for one policy type
pub struct PolicyType<E, R> {
    /// Policy type name, used in errors and logs
    name: String,

    /// Name of the type this one was specialized from
    parent: Option<String>,

    config: RegistryConfig,

    /// Authorization type -> rules in registration order
    permissions: HashMap<String, Vec<PermissionRule<E, R>>>,

    /// (authorization type, matcher) pairs registered on this type itself
    own_rules: HashSet<(String, EntityMatcher)>,

    /// Named methods available to checks
    methods: HashMap<String, Check<E, R>>,
}

impl<E, R> PolicyType<E, R> {
    /// Create an empty policy type with the strict default configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, RegistryConfig::default())
    }

    /// Create an empty policy type with a custom configuration
    pub fn with_config(name: impl Into<String>, config: RegistryConfig) -> Self {
        Self {
            name: name.into(),
            parent: None,
            config,
            permissions: HashMap::new(),
            own_rules: HashSet::new(),
            methods: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Start registering a rule for `authorization_type`
    pub fn permission(
        &mut self,
        authorization_type: impl Into<String>,
    ) -> PermissionBuilder<'_, E, R> {
        PermissionBuilder {
            policy: self,
            authorization_type: authorization_type.into(),
            matcher: EntityMatcher::Any,
            body: None,
            method: None,
        }
    }

    /// Register a rule at the end of the sequence for `authorization_type`
    ///
    /// Exactly one of `body` and `method` must be given. Method names are not
    /// checked here; they are looked up when the rule is evaluated.
    ///
    /// Registering the same authorization type and matcher as an inherited
    /// rule replaces the inherited rule in place.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::Configuration`] if `authorization_type` is empty or
    ///   the check source is invalid
    /// - [`PolicyError::DuplicateRule`] if this type already registered a rule
    ///   for the same authorization type and matcher (unless configured with
    ///   [`DuplicateRulePolicy::Overwrite`])
    ///
    /// On error the registry is left unchanged.
    pub fn register_rule(
        &mut self,
        authorization_type: impl Into<String>,
        matcher: impl Into<EntityMatcher>,
        body: Option<Check<E, R>>,
        method: Option<String>,
    ) -> Result<()> {
        let authorization_type = authorization_type.into();
        let matcher = matcher.into();

        if authorization_type.is_empty() {
            return Err(PolicyError::configuration(format!(
                "authorization type cannot be empty on {}",
                self.name
            )));
        }

        let rule = PermissionRule::new(matcher, body, method)?;
        let key = (authorization_type, matcher);
        let existing = self
            .permissions
            .get(&key.0)
            .and_then(|rules| rules.iter().position(|r| r.matcher() == &matcher));
        let reject = self.own_rules.contains(&key)
            && self.config.duplicate_rules == DuplicateRulePolicy::Reject;

        match existing {
            Some(_) if reject => {
                return Err(PolicyError::DuplicateRule {
                    policy_type: self.name.clone(),
                    authorization_type: key.0,
                    entity_type: matcher.to_string(),
                });
            }
            Some(index) => {
                debug!(
                    "Replacing rule {} for {} on {} at position {}",
                    key.0, matcher, self.name, index
                );
                if let Some(rules) = self.permissions.get_mut(&key.0) {
                    rules[index] = rule;
                }
            }
            None => {
                debug!("Registered rule {} for {} on {}", key.0, matcher, self.name);
                self.permissions.entry(key.0.clone()).or_default().push(rule);
            }
        }

        self.own_rules.insert(key);
        Ok(())
    }

    /// Define (or redefine) a named method that rules can delegate to
    pub fn define_method<F>(&mut self, name: impl Into<String>, method: F) -> Result<()>
    where
        F: Fn(&PolicyInstance<'_, E, R>) -> CheckResult + Send + Sync + 'static,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(PolicyError::configuration(format!(
                "method name cannot be empty on {}",
                self.name
            )));
        }

        debug!("Defined method {} on {}", name, self.name);
        self.methods.insert(name, check(method));
        Ok(())
    }

    /// Copy every rule table and method of this type into `child`
    ///
    /// The child receives independent copies of the rule sequences. Methods
    /// the child already defines take precedence over this type's.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Configuration`] if `child` was already derived
    /// from a type or already owns rules.
    pub fn snapshot_into(&self, child: &mut PolicyType<E, R>) -> Result<()> {
        if let Some(parent) = &child.parent {
            return Err(PolicyError::configuration(format!(
                "{} is already specialized from {}",
                child.name, parent
            )));
        }
        if !child.permissions.is_empty() {
            return Err(PolicyError::configuration(format!(
                "{} already has rules and cannot receive a snapshot of {}",
                child.name, self.name
            )));
        }

        self.copy_into(child);
        Ok(())
    }

    /// Define a new policy type specialized from this one
    pub fn specialize(&self, name: impl Into<String>) -> PolicyType<E, R> {
        let mut child = PolicyType::with_config(name, self.config.clone());
        self.copy_into(&mut child);
        child
    }

    fn copy_into(&self, child: &mut PolicyType<E, R>) {
        child.permissions = self.permissions.clone();
        for (name, method) in &self.methods {
            child
                .methods
                .entry(name.clone())
                .or_insert_with(|| Arc::clone(method));
        }
        child.parent = Some(self.name.clone());

        debug!(
            "Specialized {} from {} ({} authorization types)",
            child.name,
            self.name,
            child.permissions.len()
        );
    }

    /// Rules for `authorization_type` in registration order (empty if none)
    pub fn rules_for(&self, authorization_type: &str) -> &[PermissionRule<E, R>] {
        self.permissions
            .get(authorization_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether an accessor exists for `authorization_type`
    pub fn defines(&self, authorization_type: &str) -> bool {
        self.permissions.contains_key(authorization_type)
    }

    /// Registered authorization types, sorted by name
    pub fn authorization_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.permissions.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub(crate) fn method(&self, name: &str) -> Option<&Check<E, R>> {
        self.methods.get(name)
    }

    /// Whether a named method is defined on this type
    pub fn responds_to_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Freeze the registry
    pub fn seal(self) -> SealedPolicy<E, R> {
        info!(
            "Sealed policy type {} ({} authorization types, {} methods)",
            self.name,
            self.permissions.len(),
            self.methods.len()
        );
        SealedPolicy { inner: self }
    }
}

impl<E, R> fmt::Debug for PolicyType<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        methods.sort_unstable();

        f.debug_struct("PolicyType")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("authorization_types", &self.authorization_types())
            .field("methods", &methods)
            .finish()
    }
}

/// Builder returned by [`PolicyType::permission`]
#[must_use = "a permission is only added by calling `register`"]
pub struct PermissionBuilder<'a, E, R> {
    policy: &'a mut PolicyType<E, R>,
    authorization_type: String,
    matcher: EntityMatcher,
    body: Option<Check<E, R>>,
    method: Option<String>,
}

impl<'a, E, R> PermissionBuilder<'a, E, R> {
    /// Restrict the rule to entities of `kind` (or its subtypes)
    pub fn entity(mut self, kind: &'static EntityKind) -> Self {
        self.matcher = EntityMatcher::Kind(kind);
        self
    }

    pub fn matcher(mut self, matcher: EntityMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Use an explicit check body
    pub fn check<F>(mut self, body: F) -> Self
    where
        F: Fn(&PolicyInstance<'_, E, R>) -> CheckResult + Send + Sync + 'static,
    {
        self.body = Some(check(body));
        self
    }

    /// Delegate to a named method of the policy type
    pub fn with(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn register(self) -> Result<()> {
        self.policy
            .register_rule(self.authorization_type, self.matcher, self.body, self.method)
    }
}

/// Read-only policy type, safe to share across threads
pub struct SealedPolicy<E, R> {
    inner: PolicyType<E, R>,
}

impl<E, R> SealedPolicy<E, R> {
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn parent(&self) -> Option<&str> {
        self.inner.parent()
    }

    pub fn rules_for(&self, authorization_type: &str) -> &[PermissionRule<E, R>] {
        self.inner.rules_for(authorization_type)
    }

    pub fn defines(&self, authorization_type: &str) -> bool {
        self.inner.defines(authorization_type)
    }

    pub fn authorization_types(&self) -> Vec<&str> {
        self.inner.authorization_types()
    }

    pub fn responds_to_method(&self, name: &str) -> bool {
        self.inner.responds_to_method(name)
    }

    pub(crate) fn method(&self, name: &str) -> Option<&Check<E, R>> {
        self.inner.method(name)
    }

    /// Define a new policy type specialized from this one
    pub fn specialize(&self, name: impl Into<String>) -> PolicyType<E, R> {
        self.inner.specialize(name)
    }

    /// Build a policy instance for one authorization check
    pub fn instance(&self, entity: E, record: R) -> PolicyInstance<'_, E, R> {
        PolicyInstance::new(self, entity, record)
    }
}

impl<E, R> fmt::Debug for SealedPolicy<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SealedPolicy").field(&self.inner).finish()
    }
}
