use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use pei_core::ErrorResponse;
use pei_models::{
    Action, ActorScopeResponse, BatchCheckDto, BatchCheckResponse, CheckResultResponse,
    DenyReason, FieldVisibilityDto, FieldVisibilityResponse, InvalidateCacheResponse,
    PermissionCheckDto, RedactDto, RedactResponse, ResourceScopeDto, ResourceType, Role,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::router::health_check,
        crate::modules::permissions::controller::get_my_scope,
        crate::modules::permissions::controller::check_permission,
        crate::modules::permissions::controller::check_all_permissions,
        crate::modules::permissions::controller::check_any_permission,
        crate::modules::permissions::controller::get_field_visibility,
        crate::modules::permissions::controller::redact_record,
        crate::modules::permissions::controller::invalidate_user_scope,
    ),
    components(
        schemas(
            Role,
            Action,
            ResourceType,
            DenyReason,
            ResourceScopeDto,
            PermissionCheckDto,
            BatchCheckDto,
            CheckResultResponse,
            BatchCheckResponse,
            ActorScopeResponse,
            FieldVisibilityDto,
            FieldVisibilityResponse,
            RedactDto,
            RedactResponse,
            InvalidateCacheResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Permissions", description = "Permission checks for the caller"),
        (name = "Field Visibility", description = "Sensitive field visibility and redaction"),
        (name = "Health", description = "Liveness")
    ),
    info(
        title = "PEI Access API",
        version = "0.1.0",
        description = "Role, scope and field-level permission decisions for the school management and PEI/AEE platform.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
