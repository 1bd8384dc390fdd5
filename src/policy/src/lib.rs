//! # CretoAI Policy Registry
//!
//! Per-policy-type permission rules with ordered, type-aware resolution.
//!
//! ## Features
//!
//! - **Rule registry** keyed by authorization type, one ordered rule
//!   sequence per type, duplicate registrations rejected
//! - **Entity matching** on a static kind hierarchy, with a wildcard matcher
//! - **First-match resolution**: registration order decides precedence,
//!   no match is a definite `false`
//! - **Specialization** by snapshot: subtypes get independent copies of
//!   their parent's rule tables
//! - **Write-once, read-many**: sealed policies are `Send + Sync` and are
//!   resolved without locking
//!
//! ## Example
//!
//! ```rust
//! use cretoai_policy::{Entity, EntityKind, PolicyType};
//! use serde_json::Value;
//!
//! static USER: EntityKind = EntityKind::root("User");
//! static TOKEN: EntityKind = EntityKind::root("Token");
//!
//! enum Actor {
//!     User { id: u64 },
//!     Token,
//! }
//!
//! impl Entity for Actor {
//!     fn kind(&self) -> &'static EntityKind {
//!         match self {
//!             Actor::User { .. } => &USER,
//!             Actor::Token => &TOKEN,
//!         }
//!     }
//! }
//!
//! struct Document {
//!     owner_id: u64,
//! }
//!
//! # fn main() -> cretoai_policy::Result<()> {
//! let mut documents = PolicyType::<Actor, Document>::new("DocumentPolicy");
//! documents.define_method("is_owner", |p| {
//!     Ok(Value::Bool(matches!(p.entity(), Actor::User { id } if *id == p.record().owner_id)))
//! })?;
//! documents.permission("can_edit").entity(&USER).with("is_owner").register()?;
//! documents.permission("can_view").check(|_| Ok(Value::Bool(true))).register()?;
//!
//! let documents = documents.seal();
//!
//! let alice = documents.instance(Actor::User { id: 1 }, Document { owner_id: 1 });
//! assert!(alice.permitted("can_edit")?);
//!
//! let token = documents.instance(Actor::Token, Document { owner_id: 1 });
//! assert!(!token.permitted("can_edit")?);
//! assert!(token.permitted("can_view")?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod instance;
pub mod registry;
pub mod rule;
pub mod scope;

// Re-export commonly used types
pub use config::{DuplicateRulePolicy, RegistryConfig};
pub use engine::resolve;
pub use entity::{Entity, EntityKind, EntityMatcher};
pub use error::{CheckError, PolicyError, Result};
pub use instance::{Options, PolicyInstance};
pub use registry::{PermissionBuilder, PolicyType, SealedPolicy};
pub use rule::{check, Check, CheckResult, CheckSource, PermissionRule};
pub use scope::{IdentityResolver, Scope, ScopeResolver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
