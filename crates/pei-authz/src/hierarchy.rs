//! Role dominance.
//!
//! Roles form a tree rooted at `superadmin`. A role dominates every role below
//! it and inherits their grants. Roles on different branches (teacher and
//! aee_teacher, coordinator and school_manager) are unrelated: neither
//! inherits from the other.
//!
//! ```text
//! superadmin
//! ├── education_secretary
//! │   └── school_director
//! │       ├── coordinator
//! │       │   ├── teacher
//! │       │   ├── aee_teacher
//! │       │   ├── specialist
//! │       │   └── support_professional
//! │       └── school_manager
//! │           └── secretary
//! └── family
//! ```

use pei_models::Role;

/// The role directly above `role`, if any.
pub fn parent(role: Role) -> Option<Role> {
    match role {
        Role::Superadmin => None,
        Role::EducationSecretary | Role::Family => Some(Role::Superadmin),
        Role::SchoolDirector => Some(Role::EducationSecretary),
        Role::Coordinator | Role::SchoolManager => Some(Role::SchoolDirector),
        Role::Secretary => Some(Role::SchoolManager),
        Role::Teacher | Role::AeeTeacher | Role::Specialist | Role::SupportProfessional => {
            Some(Role::Coordinator)
        }
    }
}

/// `role` followed by its ancestors, nearest first.
pub fn ancestors(role: Role) -> impl Iterator<Item = Role> {
    std::iter::successors(Some(role), |r| parent(*r))
}

/// Whether `higher` is `lower` or one of its ancestors.
pub fn implies(higher: Role, lower: Role) -> bool {
    ancestors(lower).any(|r| r == higher)
}

/// Strict dominance: `higher` sits above `lower` in the tree.
pub fn dominates(higher: Role, lower: Role) -> bool {
    higher != lower && implies(higher, lower)
}

/// Every role whose grants `role` inherits, including itself.
pub fn implied_roles(role: Role) -> Vec<Role> {
    Role::ALL
        .into_iter()
        .filter(|other| implies(role, *other))
        .collect()
}
