//! Resolution engine
//!
//! Picks the first rule, in registration order, whose matcher accepts the
//! instance's entity and evaluates it. Precedence is purely a function of
//! registration order: a wildcard registered before a typed rule shadows it.
//!
//! ```text
//! rules_for(authorization_type)
//!     ├─ rule 0: User  ── entity is_a User? ──► evaluate, return
//!     ├─ rule 1: *     ── always matches    ──► evaluate, return
//!     └─ (exhausted)  ─────────────────────────► false
//! ```
//!
//! The engine never mutates the registry, so a sealed policy can be
//! resolved from any number of threads at once.

use crate::entity::{Entity, EntityKind};
use crate::error::{PolicyError, Result};
use crate::instance::PolicyInstance;
use crate::registry::SealedPolicy;
use crate::rule::PermissionRule;
use serde_json::Value;
use tracing::{debug, trace};

/// Find the rule that applies to an entity of `kind`
///
/// Returns the rule's position in the sequence along with the rule.
pub fn matching_rule<'a, E, R>(
    policy: &'a SealedPolicy<E, R>,
    authorization_type: &str,
    kind: &EntityKind,
) -> Option<(usize, &'a PermissionRule<E, R>)> {
    policy
        .rules_for(authorization_type)
        .iter()
        .enumerate()
        .find(|(_, rule)| rule.matcher().matches(kind))
}

/// Resolve `authorization_type` for `instance`
///
/// Returns the matched check's result unchanged, or `false` when no rule
/// matches (including when none was ever registered).
///
/// # Errors
///
/// Returns [`PolicyError::Resolution`] wrapping the cause if the matched
/// rule's check fails.
pub fn resolve<E: Entity, R>(
    instance: &PolicyInstance<'_, E, R>,
    authorization_type: &str,
) -> Result<Value> {
    let policy = instance.policy();
    let kind = instance.entity().kind();

    let Some((position, rule)) = matching_rule(policy, authorization_type, kind) else {
        debug!(
            "No rule for {} matched entity {} on {}",
            authorization_type,
            kind,
            policy.name()
        );
        return Ok(Value::Bool(false));
    };

    trace!(
        "Rule {} ({}) for {} matched entity {} on {}",
        position,
        rule.matcher(),
        authorization_type,
        kind,
        policy.name()
    );

    rule.evaluate(instance).map_err(|source| PolicyError::Resolution {
        policy_type: policy.name().to_string(),
        authorization_type: authorization_type.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PolicyType;
    use serde_json::json;

    static USER: EntityKind = EntityKind::root("User");
    static ADMIN: EntityKind = EntityKind::extends("Admin", &USER);
    static TOKEN: EntityKind = EntityKind::root("Token");

    struct Subject(&'static EntityKind);

    impl Entity for Subject {
        fn kind(&self) -> &'static EntityKind {
            self.0
        }
    }

    type Policy = PolicyType<Subject, ()>;

    fn labelled(
        policy: &mut Policy,
        authorization_type: &str,
        kind: Option<&'static EntityKind>,
        label: &'static str,
    ) {
        policy
            .permission(authorization_type)
            .matcher(kind.into())
            .check(move |_| Ok(json!(label)))
            .register()
            .unwrap();
    }

    #[test]
    fn test_first_match_wins() {
        let mut policy = Policy::new("TestPolicy");
        labelled(&mut policy, "view", None, "wildcard");
        labelled(&mut policy, "view", Some(&USER), "user");
        let policy = policy.seal();

        let instance = policy.instance(Subject(&USER), ());
        assert_eq!(resolve(&instance, "view").unwrap(), json!("wildcard"));
    }

    #[test]
    fn test_subtype_matches() {
        let mut policy = Policy::new("TestPolicy");
        labelled(&mut policy, "view", Some(&USER), "user");
        let policy = policy.seal();

        let instance = policy.instance(Subject(&ADMIN), ());
        assert_eq!(resolve(&instance, "view").unwrap(), json!("user"));
        assert_eq!(matching_rule(&policy, "view", &ADMIN).map(|(i, _)| i), Some(0));
    }

    #[test]
    fn test_no_match_is_false() {
        let mut policy = Policy::new("TestPolicy");
        labelled(&mut policy, "view", Some(&USER), "user");
        let policy = policy.seal();

        let instance = policy.instance(Subject(&TOKEN), ());
        assert_eq!(resolve(&instance, "view").unwrap(), json!(false));
        assert_eq!(resolve(&instance, "never_registered").unwrap(), json!(false));
    }

    #[test]
    fn test_failing_check_wrapped() {
        let mut policy = Policy::new("TestPolicy");
        policy.permission("view").with("missing").register().unwrap();
        let policy = policy.seal();

        let instance = policy.instance(Subject(&USER), ());
        let err = resolve(&instance, "view").unwrap_err();

        match err {
            PolicyError::Resolution {
                policy_type,
                authorization_type,
                source,
            } => {
                assert_eq!(policy_type, "TestPolicy");
                assert_eq!(authorization_type, "view");
                assert!(source.to_string().contains("missing"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
