#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use pei_access::router::init_router;
use pei_access::state::AppState;
use pei_auth::create_access_token;
use pei_authz::{Authorizer, InMemoryPermissionStore, RoleScopeRecord};
use pei_config::{AuthzConfig, CorsConfig, JwtConfig};
use pei_models::{SchoolId, StudentId, TenantId, UserId};

pub const TEST_JWT_SECRET: &str = "pei-access-test-secret";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        access_token_expiry: 3600,
    }
}

pub fn token_for(user: UserId) -> String {
    create_access_token(user.into_inner(), "usuario@escola.gov.br", &jwt_config()).unwrap()
}

/// Two tenants with one school each, populated through the in-memory store.
pub struct TestWorld {
    pub store: Arc<InMemoryPermissionStore>,
    pub tenant: TenantId,
    pub school: SchoolId,
    pub other_tenant: TenantId,
    pub other_school: SchoolId,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryPermissionStore::new()),
            tenant: TenantId::new(),
            school: SchoolId::new(),
            other_tenant: TenantId::new(),
            other_school: SchoolId::new(),
        }
    }

    /// Adds a user in the primary tenant and school.
    pub fn user(&self, roles: &[&str]) -> UserId {
        self.user_in(roles, Some(self.tenant), Some(self.school))
    }

    pub fn user_in(
        &self,
        roles: &[&str],
        tenant: Option<TenantId>,
        school: Option<SchoolId>,
    ) -> UserId {
        let user = UserId::new();
        self.store.set_user(
            user,
            RoleScopeRecord {
                roles: roles.iter().map(|r| r.to_string()).collect(),
                tenant_id: tenant,
                school_id: school,
            },
        );
        user
    }

    pub fn child_of(&self, parent: UserId) -> StudentId {
        let student = StudentId::new();
        self.store.link_guardian(parent, student);
        student
    }

    pub fn authorizer(&self, config: &AuthzConfig) -> Arc<Authorizer> {
        Arc::new(Authorizer::new(self.store.clone(), config, None))
    }

    pub fn app(&self) -> Router {
        self.app_with(&AuthzConfig::default())
    }

    pub fn app_with(&self, config: &AuthzConfig) -> Router {
        let state = AppState::new(
            self.authorizer(config),
            jwt_config(),
            CorsConfig {
                allowed_origins: vec!["http://localhost:5173".to_string()],
            },
        );
        init_router(state)
    }
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, body)
}

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}
