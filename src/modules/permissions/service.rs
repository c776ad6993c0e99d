use futures::future::join_all;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, instrument};

use pei_authz::{Authorizer, LookupFailure, PermissionCheck, any_of};
use pei_core::AppError;
use pei_models::{
    Action, ActorScope, CheckResultResponse, Decision, PermissionCheckDto, ResourceScope,
    ResourceType, UserId,
};
use pei_observability::track_permission_decision;

pub struct PermissionService;

fn unavailable(e: LookupFailure) -> AppError {
    AppError::unavailable(format!("Permission data unavailable: {e}"))
}

impl PermissionService {
    /// Resolves the caller's own scope. A failed lookup is `503`: there is no
    /// decision to report as indeterminate.
    #[instrument(skip(authz))]
    pub async fn caller_scope(authz: &Authorizer, user_id: UserId) -> Result<ActorScope, AppError> {
        authz.resolve(user_id).await.map_err(unavailable)
    }

    async fn evaluate(authz: &Authorizer, actor: &ActorScope, dto: PermissionCheckDto) -> Decision {
        match PermissionCheck::parse(&dto.action, &dto.resource_type, dto.resource.into()) {
            Ok(check) => authz.evaluator().check(actor, &check).await,
            Err(reason) => {
                let decision = Decision::deny(reason);
                track_permission_decision(decision.outcome(), "unknown");
                decision
            }
        }
    }

    /// Evaluates every check for the caller, in request order. When the
    /// caller's scope cannot be resolved every result is indeterminate.
    #[instrument(skip(authz, checks), fields(checks = checks.len()))]
    pub async fn check_all(
        authz: &Authorizer,
        user_id: UserId,
        checks: Vec<PermissionCheckDto>,
    ) -> Vec<CheckResultResponse> {
        let actor = match authz.resolve(user_id).await {
            Ok(actor) => actor,
            Err(e) => {
                let decision = Decision::indeterminate(e.to_string());
                return checks
                    .iter()
                    .map(|_| CheckResultResponse::from_decision(&decision, None))
                    .collect();
            }
        };

        let role = actor.primary_role();
        let decisions = join_all(
            checks
                .into_iter()
                .map(|dto| Self::evaluate(authz, &actor, dto)),
        )
        .await;

        decisions
            .iter()
            .map(|decision| CheckResultResponse::from_decision(decision, role))
            .collect()
    }

    #[instrument(skip(authz, dto), fields(action = %dto.action, resource_type = %dto.resource_type))]
    pub async fn check(
        authz: &Authorizer,
        user_id: UserId,
        dto: PermissionCheckDto,
    ) -> CheckResultResponse {
        match authz.resolve(user_id).await {
            Ok(actor) => {
                let decision = Self::evaluate(authz, &actor, dto).await;
                CheckResultResponse::from_decision(&decision, actor.primary_role())
            }
            Err(e) => {
                CheckResultResponse::from_decision(&Decision::indeterminate(e.to_string()), None)
            }
        }
    }

    #[instrument(skip(authz, checks), fields(checks = checks.len()))]
    pub async fn check_any(
        authz: &Authorizer,
        user_id: UserId,
        checks: Vec<PermissionCheckDto>,
    ) -> CheckResultResponse {
        let (decisions, role) = match authz.resolve(user_id).await {
            Ok(actor) => {
                let role = actor.primary_role();
                let decisions = join_all(
                    checks
                        .into_iter()
                        .map(|dto| Self::evaluate(authz, &actor, dto)),
                )
                .await;
                (decisions, role)
            }
            Err(e) => (vec![Decision::indeterminate(e.to_string())], None),
        };

        CheckResultResponse::from_decision(&any_of(decisions), role)
    }

    #[instrument(skip(authz, fields))]
    pub async fn field_visibility(
        authz: &Authorizer,
        user_id: UserId,
        fields: Vec<String>,
    ) -> Result<BTreeMap<String, bool>, AppError> {
        let actor = Self::caller_scope(authz, user_id).await?;
        let mask = authz.field_mask().await;

        Ok(fields
            .into_iter()
            .map(|field| {
                let visible = mask.visible_for(&actor.roles, &field);
                (field, visible)
            })
            .collect())
    }

    /// Returns the record without the fields the caller may not see, and the
    /// paths that were removed.
    #[instrument(skip(authz, record))]
    pub async fn redact(
        authz: &Authorizer,
        user_id: UserId,
        mut record: Value,
    ) -> Result<(Value, Vec<String>), AppError> {
        let actor = Self::caller_scope(authz, user_id).await?;
        let mask = authz.field_mask().await;
        let removed = mask.redact(&actor.roles, &mut record);
        Ok((record, removed))
    }

    /// Drops `target`'s cached scope. The caller needs `manage` on `user`
    /// within the target's tenant and school.
    #[instrument(skip(authz))]
    pub async fn invalidate(
        authz: &Authorizer,
        caller: UserId,
        target: UserId,
    ) -> Result<(), AppError> {
        let actor = Self::caller_scope(authz, caller).await?;
        let target_scope = authz.resolve(target).await.map_err(unavailable)?;

        let resource = ResourceScope {
            tenant_id: target_scope.tenant_id,
            school_id: target_scope.school_id,
            subject_student_id: None,
        };

        match authz
            .evaluator()
            .can(&actor, Action::Manage, ResourceType::User, &resource)
            .await
        {
            Decision::Allowed => {}
            Decision::Denied { reason } => {
                return Err(AppError::forbidden(format!(
                    "Not allowed to manage this user ({reason})"
                )));
            }
            Decision::Indeterminate { detail } => {
                return Err(AppError::unavailable(format!(
                    "Permission data unavailable: {detail}"
                )));
            }
        }

        authz.invalidate_user(target).await;
        info!(caller = %caller, target = %target, "Scope cache invalidated on request");

        Ok(())
    }
}
