//! # PEI Authz
//!
//! Decides whether a user may perform an action on a resource of the school
//! platform, and which sensitive student fields the user may see.
//!
//! # Modules
//!
//! - [`store`]: the [`PermissionStore`] seam and an in-memory implementation
//! - [`hierarchy`]: which roles dominate which
//! - [`policy`]: the declarative allow-table
//! - [`resolver`]: user id to roles and tenant/school scope, cached
//! - [`evaluator`]: the decision procedure
//! - [`field_mask`]: sensitive field visibility and record redaction
//! - [`authorizer`]: the facade the HTTP layer holds
//!
//! # Example
//!
//! ```ignore
//! use pei_authz::{Authorizer, InMemoryPermissionStore, PermissionCheck};
//! use pei_models::{Action, ResourceScope, ResourceType};
//!
//! let authz = Authorizer::new(Arc::new(store), &AuthzConfig::from_env(), None);
//! let check = PermissionCheck::new(Action::View, ResourceType::Student, scope);
//! if authz.check_for_user(user_id, &check).await.is_allowed() {
//!     // ...
//! }
//! ```

pub mod authorizer;
pub mod error;
pub mod evaluator;
pub mod field_mask;
pub mod hierarchy;
pub mod policy;
pub mod resolver;
pub mod store;

pub use authorizer::Authorizer;
pub use error::LookupFailure;
pub use evaluator::{PermissionCheck, PermissionEvaluator, any_of};
pub use field_mask::{FieldMask, SENSITIVE_FIELDS, is_sensitive};
pub use policy::{Grant, PolicyTable};
pub use resolver::ScopeResolver;
pub use store::{FieldRule, InMemoryPermissionStore, PermissionStore, RoleScopeRecord, StoreError};
