//! Permission decisions.
//!
//! A check passes four gates in order: superadmin bypass, the allow-table for
//! the actor's primary role, tenant/school containment, and for family actors
//! a guardian link to the student the resource is about. The first gate that
//! fails names the denial reason.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use pei_models::{
    Action, ActorScope, Decision, DenyReason, ResourceScope, ResourceType, Role, StudentId, UserId,
};
use pei_observability::track_permission_decision;

use crate::error::{LookupFailure, bounded};
use crate::policy::PolicyTable;
use crate::store::PermissionStore;

/// One requested check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCheck {
    pub action: Action,
    pub resource_type: ResourceType,
    pub resource: ResourceScope,
}

impl PermissionCheck {
    pub fn new(action: Action, resource_type: ResourceType, resource: ResourceScope) -> Self {
        Self {
            action,
            resource_type,
            resource,
        }
    }

    /// Parses wire strings. An unknown resource type or action is a denial,
    /// logged as a configuration gap between caller and policy.
    pub fn parse(
        action: &str,
        resource_type: &str,
        resource: ResourceScope,
    ) -> Result<Self, DenyReason> {
        let resource_type = resource_type.parse::<ResourceType>().map_err(|e| {
            warn!(error = %e, "Check names an unknown resource type");
            DenyReason::UnknownResourceType
        })?;
        let action = action.parse::<Action>().map_err(|e| {
            warn!(error = %e, "Check names an unknown action");
            DenyReason::UnknownAction
        })?;

        Ok(Self::new(action, resource_type, resource))
    }
}

pub struct PermissionEvaluator {
    store: Arc<dyn PermissionStore>,
    policy: Arc<PolicyTable>,
    lookup_timeout: Duration,
}

impl PermissionEvaluator {
    pub fn new(
        store: Arc<dyn PermissionStore>,
        policy: Arc<PolicyTable>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            store,
            policy,
            lookup_timeout,
        }
    }

    pub fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    #[instrument(
        skip(self, actor, resource),
        fields(user_id = %actor.user_id, action = %action, resource_type = %resource_type)
    )]
    pub async fn can(
        &self,
        actor: &ActorScope,
        action: Action,
        resource_type: ResourceType,
        resource: &ResourceScope,
    ) -> Decision {
        let decision = self.evaluate(actor, action, resource_type, resource).await;

        match &decision {
            Decision::Indeterminate { detail } => {
                warn!(detail = %detail, "Permission check indeterminate");
            }
            _ => debug!(outcome = decision.outcome(), reason = ?decision.reason(), "Permission checked"),
        }
        track_permission_decision(decision.outcome(), resource_type.as_str());

        decision
    }

    pub async fn check(&self, actor: &ActorScope, check: &PermissionCheck) -> Decision {
        self.can(actor, check.action, check.resource_type, &check.resource)
            .await
    }

    /// Evaluates every check concurrently; results keep request order.
    pub async fn can_all(&self, actor: &ActorScope, checks: &[PermissionCheck]) -> Vec<Decision> {
        join_all(checks.iter().map(|check| self.check(actor, check))).await
    }

    pub async fn can_any(&self, actor: &ActorScope, checks: &[PermissionCheck]) -> Decision {
        any_of(self.can_all(actor, checks).await)
    }

    async fn evaluate(
        &self,
        actor: &ActorScope,
        action: Action,
        resource_type: ResourceType,
        resource: &ResourceScope,
    ) -> Decision {
        if actor.has_role(Role::Superadmin) {
            return Decision::Allowed;
        }

        let Some(role) = actor.primary_role() else {
            return Decision::deny(DenyReason::NoRoles);
        };

        if !self.policy.allows(role, resource_type, action) {
            return Decision::deny(DenyReason::NotGranted);
        }

        if let Err(reason) = check_containment(actor, role, resource) {
            return Decision::deny(reason);
        }

        if role == Role::Family {
            let Some(student_id) = resource.subject_student_id else {
                return Decision::deny(DenyReason::MissingSubject);
            };
            return match self.guardian_link(actor.user_id, student_id).await {
                Ok(true) => Decision::Allowed,
                Ok(false) => Decision::deny(DenyReason::MissingGuardianLink),
                Err(e) => Decision::indeterminate(e.to_string()),
            };
        }

        Decision::Allowed
    }

    async fn guardian_link(
        &self,
        user_id: UserId,
        student_id: StudentId,
    ) -> Result<bool, LookupFailure> {
        bounded(
            "guardian_link",
            self.lookup_timeout,
            self.store.has_guardian_link(user_id, student_id),
        )
        .await
    }
}

/// Tenant must match for everyone. School-level roles also need the school
/// to match when the resource belongs to one. Family actors are bound by
/// guardian links instead of school.
fn check_containment(
    actor: &ActorScope,
    role: Role,
    resource: &ResourceScope,
) -> Result<(), DenyReason> {
    let actor_tenant = actor.tenant_id.ok_or(DenyReason::MissingScope)?;
    let resource_tenant = resource.tenant_id.ok_or(DenyReason::MissingScope)?;
    if actor_tenant != resource_tenant {
        return Err(DenyReason::CrossTenant);
    }

    if role.is_tenant_level() || role == Role::Family {
        return Ok(());
    }

    match resource.school_id {
        None => Ok(()),
        Some(resource_school) => {
            let actor_school = actor.school_id.ok_or(DenyReason::MissingScope)?;
            if actor_school == resource_school {
                Ok(())
            } else {
                Err(DenyReason::CrossSchool)
            }
        }
    }
}

/// Aggregates decisions of alternative checks: any allow wins, then any
/// indeterminate, then the first denial. No checks at all is `NotGranted`.
pub fn any_of(decisions: impl IntoIterator<Item = Decision>) -> Decision {
    let mut indeterminate = None;
    let mut denied = None;

    for decision in decisions {
        match decision {
            Decision::Allowed => return Decision::Allowed,
            Decision::Indeterminate { .. } => {
                indeterminate.get_or_insert(decision);
            }
            Decision::Denied { .. } => {
                denied.get_or_insert(decision);
            }
        }
    }

    indeterminate
        .or(denied)
        .unwrap_or(Decision::deny(DenyReason::NotGranted))
}
