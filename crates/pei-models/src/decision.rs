//! Outcome of a permission check.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Why a check was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The actor holds no known role.
    NoRoles,
    /// The allow-table has no entry for the role, resource and action.
    NotGranted,
    CrossTenant,
    CrossSchool,
    /// The actor or resource is missing the tenant/school needed to compare them.
    MissingScope,
    /// A family check on a resource that names no student.
    MissingSubject,
    MissingGuardianLink,
    UnknownResourceType,
    UnknownAction,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NoRoles => "no_roles",
            DenyReason::NotGranted => "not_granted",
            DenyReason::CrossTenant => "cross_tenant",
            DenyReason::CrossSchool => "cross_school",
            DenyReason::MissingScope => "missing_scope",
            DenyReason::MissingSubject => "missing_subject",
            DenyReason::MissingGuardianLink => "missing_guardian_link",
            DenyReason::UnknownResourceType => "unknown_resource_type",
            DenyReason::UnknownAction => "unknown_action",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating one permission check.
///
/// `Indeterminate` means a lookup needed for the decision failed or timed out.
/// It is never an allow; callers may offer a retry instead of a flat denial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Decision {
    Allowed,
    Denied { reason: DenyReason },
    Indeterminate { detail: String },
}

impl Decision {
    pub fn deny(reason: DenyReason) -> Self {
        Decision::Denied { reason }
    }

    pub fn indeterminate(detail: impl Into<String>) -> Self {
        Decision::Indeterminate {
            detail: detail.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Decision::Indeterminate { .. })
    }

    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Denied { reason } => Some(*reason),
            _ => None,
        }
    }

    /// Metric label for this outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            Decision::Allowed => "allowed",
            Decision::Denied { .. } => "denied",
            Decision::Indeterminate { .. } => "indeterminate",
        }
    }
}
