//! Request and response DTOs of the `/api/permissions` endpoints.
//!
//! Action and resource type arrive as plain strings: an unknown value is a
//! denied check with a reason, not a malformed request.

use pei_core::serde::deserialize_optional_uuid;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::decision::{Decision, DenyReason};
use crate::ids::{SchoolId, StudentId, TenantId, UserId};
use crate::roles::Role;
use crate::scope::{ActorScope, ResourceScope};

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct ResourceScopeDto {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub tenant_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub school_id: Option<Uuid>,
    /// Student the resource is about (required for family access).
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub student_id: Option<Uuid>,
}

impl From<ResourceScopeDto> for ResourceScope {
    fn from(dto: ResourceScopeDto) -> Self {
        ResourceScope {
            tenant_id: dto.tenant_id.map(TenantId::from),
            school_id: dto.school_id.map(SchoolId::from),
            subject_student_id: dto.student_id.map(StudentId::from),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct PermissionCheckDto {
    #[validate(length(min = 1, max = 64, message = "Action must be between 1 and 64 characters"))]
    pub action: String,
    #[validate(length(
        min = 1,
        max = 64,
        message = "Resource type must be between 1 and 64 characters"
    ))]
    pub resource_type: String,
    #[serde(default)]
    pub resource: ResourceScopeDto,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BatchCheckDto {
    #[validate(
        length(min = 1, max = 50, message = "Between 1 and 50 checks per request"),
        nested
    )]
    pub checks: Vec<PermissionCheckDto>,
}

/// Flattened view of a [`Decision`] for API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CheckResultResponse {
    pub allowed: bool,
    /// Set when a lookup failed; the client may retry.
    pub indeterminate: bool,
    pub reason: Option<DenyReason>,
    pub detail: Option<String>,
    /// Primary role the decision was taken for.
    pub role: Option<Role>,
}

impl CheckResultResponse {
    pub fn from_decision(decision: &Decision, role: Option<Role>) -> Self {
        let detail = match decision {
            Decision::Indeterminate { detail } => Some(detail.clone()),
            _ => None,
        };

        Self {
            allowed: decision.is_allowed(),
            indeterminate: decision.is_indeterminate(),
            reason: decision.reason(),
            detail,
            role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BatchCheckResponse {
    pub results: Vec<CheckResultResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActorScopeResponse {
    pub user_id: UserId,
    pub roles: BTreeSet<Role>,
    pub primary_role: Option<Role>,
    pub tenant_id: Option<TenantId>,
    pub school_id: Option<SchoolId>,
}

impl From<ActorScope> for ActorScopeResponse {
    fn from(scope: ActorScope) -> Self {
        Self {
            primary_role: scope.primary_role(),
            user_id: scope.user_id,
            roles: scope.roles,
            tenant_id: scope.tenant_id,
            school_id: scope.school_id,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FieldVisibilityDto {
    #[validate(length(min = 1, max = 100, message = "Between 1 and 100 fields per request"))]
    pub fields: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FieldVisibilityResponse {
    pub fields: BTreeMap<String, bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RedactDto {
    #[schema(value_type = Object)]
    pub record: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RedactResponse {
    #[schema(value_type = Object)]
    pub record: serde_json::Value,
    /// Paths of the fields that were removed.
    pub redacted: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvalidateCacheResponse {
    pub message: String,
    pub user_id: UserId,
}
