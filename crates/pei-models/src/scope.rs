//! Actor and resource scopes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;

use crate::ids::{SchoolId, StudentId, TenantId, UserId};
use crate::roles::Role;

/// Roles and organisational scope of the user performing an action.
///
/// A user unknown to the profile store resolves to an empty scope, which every
/// check denies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActorScope {
    pub user_id: UserId,
    pub roles: BTreeSet<Role>,
    pub tenant_id: Option<TenantId>,
    pub school_id: Option<SchoolId>,
}

impl ActorScope {
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            roles: BTreeSet::new(),
            tenant_id: None,
            school_id: None,
        }
    }

    pub fn new(
        user_id: UserId,
        roles: impl IntoIterator<Item = Role>,
        tenant_id: Option<TenantId>,
        school_id: Option<SchoolId>,
    ) -> Self {
        Self {
            user_id,
            roles: roles.into_iter().collect(),
            tenant_id,
            school_id,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// The held role with the highest precedence.
    pub fn primary_role(&self) -> Option<Role> {
        self.roles.iter().copied().max_by_key(Role::precedence)
    }
}

/// Where a resource lives.
///
/// `school_id` is `None` only for tenant-wide resources (the network itself,
/// network dashboards). `subject_student_id` names the student a record is
/// about, which is what guardian links are checked against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResourceScope {
    pub tenant_id: Option<TenantId>,
    pub school_id: Option<SchoolId>,
    pub subject_student_id: Option<StudentId>,
}

impl ResourceScope {
    pub fn in_school(tenant_id: TenantId, school_id: SchoolId) -> Self {
        Self {
            tenant_id: Some(tenant_id),
            school_id: Some(school_id),
            subject_student_id: None,
        }
    }

    pub fn tenant_wide(tenant_id: TenantId) -> Self {
        Self {
            tenant_id: Some(tenant_id),
            school_id: None,
            subject_student_id: None,
        }
    }

    pub fn about_student(mut self, student_id: StudentId) -> Self {
        self.subject_student_id = Some(student_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_role_is_highest_precedence() {
        let actor = ActorScope::new(
            UserId::new(),
            [Role::Teacher, Role::Family, Role::Coordinator],
            None,
            None,
        );
        assert_eq!(actor.primary_role(), Some(Role::Coordinator));
    }

    #[test]
    fn test_empty_scope_has_no_primary_role() {
        let actor = ActorScope::empty(UserId::new());
        assert!(actor.is_empty());
        assert_eq!(actor.primary_role(), None);
    }

    #[test]
    fn test_resource_scope_builders() {
        let tenant = TenantId::new();
        let school = SchoolId::new();
        let student = StudentId::new();

        let scope = ResourceScope::in_school(tenant, school).about_student(student);
        assert_eq!(scope.tenant_id, Some(tenant));
        assert_eq!(scope.school_id, Some(school));
        assert_eq!(scope.subject_student_id, Some(student));

        assert_eq!(ResourceScope::tenant_wide(tenant).school_id, None);
    }

    #[test]
    fn test_actor_scope_serde_round_trip() {
        let actor = ActorScope::new(
            UserId::new(),
            [Role::AeeTeacher],
            Some(TenantId::new()),
            Some(SchoolId::new()),
        );
        let json = serde_json::to_string(&actor).unwrap();
        let back: ActorScope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, actor);
    }
}
