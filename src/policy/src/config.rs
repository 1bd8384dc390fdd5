//! Registry configuration

use serde::{Deserialize, Serialize};

/// What to do when a rule is registered twice for the same
/// authorization type and entity matcher on one policy type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateRulePolicy {
    /// Fail with `PolicyError::DuplicateRule`
    #[default]
    Reject,
    /// Replace the earlier rule in place, keeping its position
    ///
    /// Compatibility mode for rule sets written against the permissive
    /// registry behaviour. Not recommended for new policies.
    Overwrite,
}

/// Policy type registry configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Duplicate registration handling
    #[serde(default)]
    pub duplicate_rules: DuplicateRulePolicy,
}

impl RegistryConfig {
    /// Configuration that silently replaces duplicate rules
    pub fn permissive() -> Self {
        Self {
            duplicate_rules: DuplicateRulePolicy::Overwrite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_strict() {
        assert_eq!(RegistryConfig::default().duplicate_rules, DuplicateRulePolicy::Reject);
    }

    #[test]
    fn test_deserialize() {
        let config: RegistryConfig =
            serde_json::from_str(r#"{"duplicate_rules": "overwrite"}"#).unwrap();
        assert_eq!(config, RegistryConfig::permissive());

        let config: RegistryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RegistryConfig::default());
    }
}
