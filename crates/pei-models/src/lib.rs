//! # PEI Models
//!
//! Domain types shared by the authorization engine, the store and the HTTP layer.
//!
//! # Modules
//!
//! - [`ids`]: strongly-typed UUID newtypes (`UserId`, `TenantId`, ...)
//! - [`roles`]: the [`Role`] tag and its precedence order
//! - [`resources`]: [`ResourceType`] and [`Action`]
//! - [`scope`]: who is acting ([`ActorScope`]) and what is being touched ([`ResourceScope`])
//! - [`decision`]: the outcome of a permission check
//! - [`permissions`]: request/response DTOs of the permission endpoints
//!
//! # Example
//!
//! ```ignore
//! use pei_models::{Action, ResourceType, Role};
//!
//! let role: Role = "aee_teacher".parse()?;
//! assert_eq!(role, Role::AeeTeacher);
//! let action: Action = "issue_document".parse()?;
//! let resource: ResourceType = "pei".parse()?;
//! ```

pub mod decision;
pub mod ids;
pub mod permissions;
pub mod resources;
pub mod roles;
pub mod scope;

pub use decision::{Decision, DenyReason};
pub use ids::{SchoolId, StudentId, TenantId, UserId};
pub use permissions::{
    ActorScopeResponse, BatchCheckDto, BatchCheckResponse, CheckResultResponse,
    FieldVisibilityDto, FieldVisibilityResponse, InvalidateCacheResponse, PermissionCheckDto,
    RedactDto, RedactResponse, ResourceScopeDto,
};
pub use resources::{Action, ResourceType, UnknownAction, UnknownResourceType};
pub use roles::{Role, UnknownRole};
pub use scope::{ActorScope, ResourceScope};
