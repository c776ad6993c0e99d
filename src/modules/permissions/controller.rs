use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;
use uuid::Uuid;

use pei_core::{AppError, ErrorResponse};
use pei_models::{
    ActorScopeResponse, BatchCheckDto, BatchCheckResponse, CheckResultResponse,
    FieldVisibilityDto, FieldVisibilityResponse, InvalidateCacheResponse, PermissionCheckDto,
    RedactDto, RedactResponse, UserId,
};

use crate::middleware::auth::AuthUser;
use crate::modules::permissions::service::PermissionService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/permissions/me",
    responses(
        (status = 200, description = "Resolved roles and scope of the caller", body = ActorScopeResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 503, description = "Permission store unavailable", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Permissions"
)]
#[instrument(skip(state))]
pub async fn get_my_scope(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<ActorScopeResponse>, AppError> {
    let user_id = auth_user.user_id()?;
    let scope = PermissionService::caller_scope(&state.authz, user_id).await?;
    Ok(Json(scope.into()))
}

#[utoipa::path(
    post,
    path = "/api/permissions/check",
    request_body = PermissionCheckDto,
    responses(
        (status = 200, description = "Decision for one check; indeterminate when a lookup failed", body = CheckResultResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Permissions"
)]
#[instrument(skip(state))]
pub async fn check_permission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<PermissionCheckDto>,
) -> Result<Json<CheckResultResponse>, AppError> {
    let user_id = auth_user.user_id()?;
    Ok(Json(PermissionService::check(&state.authz, user_id, dto).await))
}

#[utoipa::path(
    post,
    path = "/api/permissions/check-all",
    request_body = BatchCheckDto,
    responses(
        (status = 200, description = "One decision per check, in request order", body = BatchCheckResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Permissions"
)]
#[instrument(skip(state, dto))]
pub async fn check_all_permissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<BatchCheckDto>,
) -> Result<Json<BatchCheckResponse>, AppError> {
    let user_id = auth_user.user_id()?;
    let results = PermissionService::check_all(&state.authz, user_id, dto.checks).await;
    Ok(Json(BatchCheckResponse { results }))
}

#[utoipa::path(
    post,
    path = "/api/permissions/check-any",
    request_body = BatchCheckDto,
    responses(
        (status = 200, description = "Allowed if any check is allowed", body = CheckResultResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Permissions"
)]
#[instrument(skip(state, dto))]
pub async fn check_any_permission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<BatchCheckDto>,
) -> Result<Json<CheckResultResponse>, AppError> {
    let user_id = auth_user.user_id()?;
    Ok(Json(
        PermissionService::check_any(&state.authz, user_id, dto.checks).await,
    ))
}

#[utoipa::path(
    post,
    path = "/api/permissions/fields/visibility",
    request_body = FieldVisibilityDto,
    responses(
        (status = 200, description = "Visibility of each requested field for the caller", body = FieldVisibilityResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 503, description = "Permission store unavailable", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Field Visibility"
)]
#[instrument(skip(state, dto))]
pub async fn get_field_visibility(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<FieldVisibilityDto>,
) -> Result<Json<FieldVisibilityResponse>, AppError> {
    let user_id = auth_user.user_id()?;
    let fields = PermissionService::field_visibility(&state.authz, user_id, dto.fields).await?;
    Ok(Json(FieldVisibilityResponse { fields }))
}

#[utoipa::path(
    post,
    path = "/api/permissions/redact",
    request_body = RedactDto,
    responses(
        (status = 200, description = "Record without the fields the caller may not see", body = RedactResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 503, description = "Permission store unavailable", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Field Visibility"
)]
#[instrument(skip(state, dto))]
pub async fn redact_record(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(dto): Json<RedactDto>,
) -> Result<Json<RedactResponse>, AppError> {
    let user_id = auth_user.user_id()?;
    let (record, redacted) = PermissionService::redact(&state.authz, user_id, dto.record).await?;
    Ok(Json(RedactResponse { record, redacted }))
}

#[utoipa::path(
    post,
    path = "/api/permissions/users/{user_id}/invalidate",
    params(
        ("user_id" = Uuid, Path, description = "User whose cached scope is dropped")
    ),
    responses(
        (status = 200, description = "Cached scope dropped", body = InvalidateCacheResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - requires manage on user", body = ErrorResponse),
        (status = 503, description = "Permission store unavailable", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Permissions"
)]
#[instrument(skip(state))]
pub async fn invalidate_user_scope(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<InvalidateCacheResponse>, AppError> {
    let caller = auth_user.user_id()?;
    let target = UserId::from(user_id);

    PermissionService::invalidate(&state.authz, caller, target).await?;

    Ok(Json(InvalidateCacheResponse {
        message: "Scope cache invalidated".to_string(),
        user_id: target,
    }))
}
