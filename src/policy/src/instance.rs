//! Policy instances
//!
//! A [`PolicyInstance`] binds one sealed policy type to the entity being
//! authorized, the record being acted upon and an open options bag. It is
//! built per authorization check and is the context every check receives.

use crate::engine;
use crate::entity::Entity;
use crate::error::{PolicyError, Result};
use crate::registry::SealedPolicy;
use crate::rule::CheckResult;
use serde_json::Value;
use std::fmt;

/// Open configuration bag passed through to checks
pub type Options = serde_json::Map<String, Value>;

/// Policy type bound to an entity, a record and options
pub struct PolicyInstance<'p, E, R> {
    policy: &'p SealedPolicy<E, R>,
    entity: E,
    record: R,
    options: Options,
}

impl<'p, E, R> PolicyInstance<'p, E, R> {
    /// Create an instance with empty options
    pub fn new(policy: &'p SealedPolicy<E, R>, entity: E, record: R) -> Self {
        Self {
            policy,
            entity,
            record,
            options: Options::new(),
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn policy(&self) -> &'p SealedPolicy<E, R> {
        self.policy
    }

    /// The subject being authorized
    pub fn entity(&self) -> &E {
        &self.entity
    }

    /// The object being acted upon
    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Replace the options bag wholesale
    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    /// Invoke a named method of the policy type with this instance as context
    pub fn call(&self, method: &str) -> CheckResult {
        match self.policy.method(method) {
            Some(body) => body(self),
            None => Err(Box::new(PolicyError::UndefinedMethod {
                policy_type: self.policy.name().to_string(),
                method: method.to_string(),
            })),
        }
    }
}

impl<'p, E: Entity, R> PolicyInstance<'p, E, R> {
    /// Whether the policy type has an accessor for `authorization_type`
    pub fn responds_to(&self, authorization_type: &str) -> bool {
        self.policy.defines(authorization_type)
    }

    /// Resolve `authorization_type` for this instance
    ///
    /// # Errors
    ///
    /// - [`PolicyError::NoSuchAuthorization`] if no rule was ever registered
    ///   for `authorization_type` on the policy type
    /// - [`PolicyError::Resolution`] if the matched rule's check fails
    pub fn authorize(&self, authorization_type: &str) -> Result<Value> {
        if !self.responds_to(authorization_type) {
            return Err(PolicyError::NoSuchAuthorization {
                policy_type: self.policy.name().to_string(),
                authorization_type: authorization_type.to_string(),
            });
        }

        engine::resolve(self, authorization_type)
    }

    /// [`authorize`](Self::authorize), reduced to a yes/no answer
    ///
    /// `null` and `false` deny; any other value permits.
    pub fn permitted(&self, authorization_type: &str) -> Result<bool> {
        self.authorize(authorization_type).map(|value| is_truthy(&value))
    }
}

impl<E: fmt::Debug, R: fmt::Debug> fmt::Debug for PolicyInstance<'_, E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyInstance")
            .field("policy", &self.policy.name())
            .field("entity", &self.entity)
            .field("record", &self.record)
            .field("options", &self.options)
            .finish()
    }
}

/// `null` and `false` are falsy, everything else is truthy
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use crate::registry::PolicyType;
    use serde_json::json;

    static USER: EntityKind = EntityKind::root("User");

    #[derive(Debug)]
    struct User {
        id: u64,
    }

    impl Entity for User {
        fn kind(&self) -> &'static EntityKind {
            &USER
        }
    }

    #[derive(Debug)]
    struct Post {
        author_id: u64,
    }

    fn post_policy() -> SealedPolicy<User, Post> {
        let mut policy = PolicyType::<User, Post>::new("PostPolicy");
        policy
            .define_method("is_author", |p: &PolicyInstance<'_, User, Post>| {
                Ok(Value::Bool(p.entity().id == p.record().author_id))
            })
            .unwrap();
        policy
            .permission("can_edit")
            .entity(&USER)
            .with("is_author")
            .register()
            .unwrap();
        policy
            .permission("can_archive")
            .check(|p| Ok(p.option("archive_window").cloned().unwrap_or(Value::Null)))
            .register()
            .unwrap();
        policy.seal()
    }

    #[test]
    fn test_accessors() {
        let policy = post_policy();
        let instance = PolicyInstance::new(&policy, User { id: 1 }, Post { author_id: 2 })
            .with_options(json!({"source": "api"}).as_object().cloned().unwrap());

        assert_eq!(instance.entity().id, 1);
        assert_eq!(instance.record().author_id, 2);
        assert_eq!(instance.option("source"), Some(&json!("api")));
        assert_eq!(instance.policy().name(), "PostPolicy");
    }

    #[test]
    fn test_authorize_via_method() {
        let policy = post_policy();

        let author = policy.instance(User { id: 7 }, Post { author_id: 7 });
        let other = policy.instance(User { id: 7 }, Post { author_id: 8 });

        assert!(author.permitted("can_edit").unwrap());
        assert!(!other.permitted("can_edit").unwrap());
    }

    #[test]
    fn test_set_options_replaces_bag() {
        let policy = post_policy();
        let mut instance = policy.instance(User { id: 1 }, Post { author_id: 1 });
        assert_eq!(instance.authorize("can_archive").unwrap(), Value::Null);

        let mut options = Options::new();
        options.insert("archive_window".to_string(), json!(30));
        instance.set_options(options);

        assert_eq!(instance.authorize("can_archive").unwrap(), json!(30));
        assert!(instance.permitted("can_archive").unwrap());
    }

    #[test]
    fn test_unknown_authorization_has_no_accessor() {
        let policy = post_policy();
        let instance = policy.instance(User { id: 1 }, Post { author_id: 1 });

        assert!(!instance.responds_to("can_delete"));
        assert!(matches!(
            instance.authorize("can_delete"),
            Err(PolicyError::NoSuchAuthorization { .. })
        ));
    }

    #[test]
    fn test_call_undefined_method() {
        let policy = post_policy();
        let instance = policy.instance(User { id: 1 }, Post { author_id: 1 });

        let err = instance.call("missing").unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(0)));
        assert!(is_truthy(&json!("")));
    }
}
