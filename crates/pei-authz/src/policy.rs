//! The allow-table.
//!
//! Grants are declared per role in [`default_grants`]. [`PolicyTable`]
//! expands them once at construction so that each role also carries every
//! grant of the roles it dominates; lookups are then a single hash probe.

use std::collections::{BTreeSet, HashMap};

use pei_models::{Action, ResourceType, Role};

use crate::hierarchy;

/// One declared row: `role` may perform `actions` on `resource`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub role: Role,
    pub resource: ResourceType,
    pub actions: Vec<Action>,
}

impl Grant {
    pub fn new(role: Role, resource: ResourceType, actions: &[Action]) -> Self {
        Self {
            role,
            resource,
            actions: actions.to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PolicyTable {
    effective: HashMap<(Role, ResourceType), BTreeSet<Action>>,
}

impl PolicyTable {
    /// Builds the effective table from declared grants, folding in the grants
    /// of dominated roles.
    pub fn from_grants(grants: impl IntoIterator<Item = Grant>) -> Self {
        let mut declared: HashMap<(Role, ResourceType), BTreeSet<Action>> = HashMap::new();
        for grant in grants {
            declared
                .entry((grant.role, grant.resource))
                .or_default()
                .extend(grant.actions);
        }

        let mut effective: HashMap<(Role, ResourceType), BTreeSet<Action>> = HashMap::new();
        for role in Role::ALL {
            for inherited in hierarchy::implied_roles(role) {
                for resource in ResourceType::ALL {
                    if let Some(actions) = declared.get(&(inherited, resource)) {
                        effective
                            .entry((role, resource))
                            .or_default()
                            .extend(actions.iter().copied());
                    }
                }
            }
        }

        Self { effective }
    }

    pub fn allows(&self, role: Role, resource: ResourceType, action: Action) -> bool {
        self.effective
            .get(&(role, resource))
            .is_some_and(|actions| actions.contains(&action))
    }

    /// Effective actions of `role` on `resource`, in declaration order of [`Action`].
    pub fn actions(&self, role: Role, resource: ResourceType) -> Vec<Action> {
        self.effective
            .get(&(role, resource))
            .map(|actions| actions.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::from_grants(default_grants())
    }
}

/// The platform's declared grants. Superadmin is absent: the evaluator allows
/// it before consulting the table, and it dominates every role anyway.
pub fn default_grants() -> Vec<Grant> {
    use Action::*;
    use ResourceType as R;

    let rows: &[(Role, &[(ResourceType, &[Action])])] = &[
        (
            Role::EducationSecretary,
            &[
                (R::Student, &[View, Export]),
                (R::Pei, &[View, Approve, Reject, Export]),
                (R::Aee, &[View, Export]),
                (R::Class, &[View, Create, Edit, Export]),
                (R::Enrollment, &[View, Create, Edit, Export]),
                (R::Document, &[View, IssueDocument, Export]),
                (R::Transfer, &[View, Create, Edit, Export]),
                (R::Occurrence, &[View, Export]),
                (R::Ticket, &[View, Create, Edit, Export]),
                (R::School, &[View, Create, Edit]),
                (R::Network, &[View, Manage]),
                (R::User, &[View, Create, Edit]),
                (R::Dashboard, &[View, Export]),
                (R::Report, &[View, Create, Export]),
                (R::Activity, &[View, Export]),
                (R::Planning, &[View, Export]),
            ],
        ),
        (
            Role::SchoolDirector,
            &[
                (R::Student, &[View, Create, Edit, Export]),
                (R::Pei, &[View, Approve, Reject, Export]),
                (R::Aee, &[View, Export]),
                (R::Class, &[View, Create, Edit, Delete]),
                (R::Enrollment, &[View, Create, Edit]),
                (R::Document, &[View, IssueDocument, Export]),
                (R::Transfer, &[View, Create, Edit]),
                (R::Occurrence, &[View, Create, Edit]),
                (R::Ticket, &[View, Create, Edit]),
                (R::School, &[View, Edit, Manage]),
                (R::Network, &[View]),
                (R::User, &[View, Create, Edit]),
                (R::Dashboard, &[View]),
                (R::Report, &[View, Create, Export]),
                (R::Activity, &[View]),
                (R::Planning, &[View, Approve, Reject]),
            ],
        ),
        (
            Role::SchoolManager,
            &[
                (R::Student, &[View, Create, Edit, Export]),
                (R::Pei, &[View]),
                (R::Aee, &[View]),
                (R::Class, &[View, Create, Edit]),
                (R::Enrollment, &[View, Create, Edit]),
                (R::Document, &[View, IssueDocument, Export]),
                (R::Transfer, &[View, Create, Edit]),
                (R::Occurrence, &[View, Create, Edit]),
                (R::Ticket, &[View, Create, Edit]),
                (R::School, &[View, Edit]),
                (R::Network, &[View]),
                (R::User, &[View, Create, Edit]),
                (R::Dashboard, &[View]),
                (R::Report, &[View, Create, Export]),
            ],
        ),
        (
            Role::Coordinator,
            &[
                (R::Student, &[View, Edit, Export]),
                (R::Pei, &[View, Create, Edit, Approve, Reject, Export]),
                (R::Aee, &[View, Export]),
                (R::Class, &[View]),
                (R::Enrollment, &[View]),
                (R::Document, &[View, Export]),
                (R::Transfer, &[View]),
                (R::Occurrence, &[View, Create, Edit]),
                (R::Ticket, &[View, Create]),
                (R::School, &[View]),
                (R::Network, &[View]),
                (R::User, &[View]),
                (R::Dashboard, &[View]),
                (R::Report, &[View, Create, Export]),
                (R::Activity, &[View, Export]),
                (R::Planning, &[View, Approve, Reject, Export]),
            ],
        ),
        (
            Role::Secretary,
            &[
                (R::Student, &[View, Edit]),
                (R::Pei, &[View]),
                (R::Aee, &[View]),
                (R::Class, &[View]),
                (R::Enrollment, &[View, Create, Edit]),
                (R::Document, &[View, Create, Edit, IssueDocument]),
                (R::Transfer, &[View, Create, Edit]),
                (R::Occurrence, &[View, Create, Edit]),
                (R::Ticket, &[View, Create, Edit]),
                (R::School, &[View]),
                (R::User, &[View]),
                (R::Dashboard, &[View]),
                (R::Report, &[View, Create]),
            ],
        ),
        (
            Role::AeeTeacher,
            &[
                (R::Student, &[View]),
                (R::Pei, &[View]),
                (R::Aee, &[View, Create, Edit]),
                (R::Class, &[View]),
                (R::Enrollment, &[View]),
                (R::Document, &[View]),
                (R::Transfer, &[View]),
                (R::Occurrence, &[View, Create]),
                (R::Ticket, &[View, Create]),
                (R::School, &[View]),
                (R::Dashboard, &[View]),
                (R::Report, &[View]),
                (R::Activity, &[View, Create, Edit, Delete]),
                (R::Planning, &[View, Create, Edit, Delete]),
            ],
        ),
        (
            Role::Teacher,
            &[
                (R::Student, &[View]),
                (R::Pei, &[View, Create, Edit]),
                (R::Aee, &[View]),
                (R::Class, &[View, Edit]),
                (R::Enrollment, &[View]),
                (R::Document, &[View]),
                (R::Transfer, &[View]),
                (R::Occurrence, &[View, Create]),
                (R::Ticket, &[View, Create]),
                (R::School, &[View]),
                (R::Dashboard, &[View]),
                (R::Report, &[View]),
                (R::Activity, &[View, Create, Edit, Delete]),
                (R::Planning, &[View]),
            ],
        ),
        (
            Role::Specialist,
            &[
                (R::Student, &[View]),
                (R::Pei, &[View]),
                (R::Aee, &[View]),
                (R::Class, &[View]),
                (R::Enrollment, &[View]),
                (R::Document, &[View]),
                (R::Transfer, &[View]),
                (R::Occurrence, &[View]),
                (R::Ticket, &[View]),
                (R::School, &[View]),
                (R::Dashboard, &[View]),
                (R::Report, &[View]),
                (R::Activity, &[View]),
                (R::Planning, &[View]),
            ],
        ),
        (
            Role::SupportProfessional,
            &[
                (R::Student, &[View]),
                (R::Pei, &[View]),
                (R::Aee, &[View]),
                (R::Class, &[View]),
                (R::Enrollment, &[View]),
                (R::Document, &[View]),
                (R::Transfer, &[View]),
                (R::Occurrence, &[View, Create]),
                (R::Ticket, &[View, Create]),
                (R::School, &[View]),
                (R::Dashboard, &[View]),
                (R::Activity, &[View]),
            ],
        ),
        (
            Role::Family,
            &[
                (R::Student, &[View]),
                (R::Pei, &[View]),
                (R::Aee, &[View]),
                (R::Class, &[View]),
                (R::Enrollment, &[View]),
                (R::Document, &[View]),
                (R::Ticket, &[View, Create]),
                (R::School, &[View]),
                (R::Activity, &[View]),
                (R::Planning, &[View]),
            ],
        ),
    ];

    rows.iter()
        .flat_map(|(role, resources)| {
            resources
                .iter()
                .map(|(resource, actions)| Grant::new(*role, *resource, actions))
        })
        .collect()
}
