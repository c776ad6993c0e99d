//! Role tags.
//!
//! Roles are stored as snake_case strings in `user_roles.role`. The precedence
//! order defined here is total and is only used to pick a user's primary role;
//! which roles imply which is a separate, partial relation owned by the
//! authorization engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superadmin,
    EducationSecretary,
    SchoolDirector,
    SchoolManager,
    Coordinator,
    Secretary,
    AeeTeacher,
    Teacher,
    Specialist,
    SupportProfessional,
    Family,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 11] = [
        Role::Superadmin,
        Role::EducationSecretary,
        Role::SchoolDirector,
        Role::SchoolManager,
        Role::Coordinator,
        Role::Secretary,
        Role::AeeTeacher,
        Role::Teacher,
        Role::Specialist,
        Role::SupportProfessional,
        Role::Family,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::EducationSecretary => "education_secretary",
            Role::SchoolDirector => "school_director",
            Role::SchoolManager => "school_manager",
            Role::Coordinator => "coordinator",
            Role::Secretary => "secretary",
            Role::AeeTeacher => "aee_teacher",
            Role::Teacher => "teacher",
            Role::Specialist => "specialist",
            Role::SupportProfessional => "support_professional",
            Role::Family => "family",
        }
    }

    /// Position in the fixed total order used to choose a primary role
    /// (higher number = more privileges).
    pub fn precedence(&self) -> u8 {
        match self {
            Role::Superadmin => 100,
            Role::EducationSecretary => 90,
            Role::SchoolDirector => 80,
            Role::SchoolManager => 75,
            Role::Coordinator => 70,
            Role::Secretary => 65,
            Role::AeeTeacher => 60,
            Role::Teacher => 55,
            Role::Specialist => 50,
            Role::SupportProfessional => 40,
            Role::Family => 10,
        }
    }

    /// Tenant-level roles are scoped to a whole network rather than one school.
    pub fn is_tenant_level(&self) -> bool {
        matches!(self, Role::Superadmin | Role::EducationSecretary)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s.trim())
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
