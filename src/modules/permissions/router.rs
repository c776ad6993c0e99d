use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::permissions::controller::{
    check_all_permissions, check_any_permission, check_permission, get_field_visibility,
    get_my_scope, invalidate_user_scope, redact_record,
};
use crate::state::AppState;

pub fn init_permissions_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_my_scope))
        .route("/check", post(check_permission))
        .route("/check-all", post(check_all_permissions))
        .route("/check-any", post(check_any_permission))
        .route("/fields/visibility", post(get_field_visibility))
        .route("/redact", post(redact_record))
        .route("/users/{user_id}/invalidate", post(invalidate_user_scope))
}
