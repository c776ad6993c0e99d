use axum::extract::FromRequestParts;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use uuid::Uuid;

use pei_access::middleware::auth::AuthUser;
use pei_access::state::AppState;
use pei_auth::create_access_token;
use pei_authz::{Authorizer, InMemoryPermissionStore};
use pei_config::{AuthzConfig, CorsConfig, JwtConfig};

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
    }
}

fn get_test_state() -> AppState {
    let store = Arc::new(InMemoryPermissionStore::new());
    AppState::new(
        Arc::new(Authorizer::new(store, &AuthzConfig::default(), None)),
        get_test_jwt_config(),
        CorsConfig {
            allowed_origins: vec![],
        },
    )
}

async fn extract(authorization: Option<&str>) -> Result<AuthUser, pei_core::AppError> {
    let mut builder = Request::builder().uri("/api/permissions/me");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    let (mut parts, _) = builder.body(()).unwrap().into_parts();
    AuthUser::from_request_parts(&mut parts, &get_test_state()).await
}

#[tokio::test]
async fn test_valid_bearer_token() {
    let user_id = Uuid::new_v4();
    let token =
        create_access_token(user_id, "diretora@escola.gov.br", &get_test_jwt_config()).unwrap();

    let auth_user = extract(Some(&format!("Bearer {token}"))).await.unwrap();

    assert_eq!(auth_user.user_id().unwrap().into_inner(), user_id);
    assert_eq!(auth_user.email(), "diretora@escola.gov.br");
}

#[tokio::test]
async fn test_missing_header() {
    let err = extract(None).await.unwrap_err();
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_scheme() {
    let err = extract(Some("Basic dXNlcjpwYXNz")).await.unwrap_err();
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret() {
    let other = JwtConfig {
        secret: "some_other_secret".to_string(),
        access_token_expiry: 3600,
    };
    let token = create_access_token(Uuid::new_v4(), "x@escola.gov.br", &other).unwrap();

    let err = extract(Some(&format!("Bearer {token}"))).await.unwrap_err();
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_uuid_subject_is_rejected() {
    let auth_user = AuthUser(pei_auth::Claims {
        sub: "not-a-uuid".to_string(),
        email: "x@escola.gov.br".to_string(),
        exp: usize::MAX,
        iat: 0,
    });

    let err = auth_user.user_id().unwrap_err();
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
}
