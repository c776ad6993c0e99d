use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

use pei_authz::{Authorizer, InMemoryPermissionStore, PermissionStore};
use pei_cache::{CacheConfig, RedisCache};
use pei_config::{AuthzConfig, CorsConfig, DatabaseConfig, JwtConfig};
use pei_db::{PgPermissionStore, init_db_pool};
use pei_observability::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub authz: Arc<Authorizer>,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("cors_config", &self.cors_config)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(authz: Arc<Authorizer>, jwt_config: JwtConfig, cors_config: CorsConfig) -> Self {
        Self {
            authz,
            jwt_config,
            cors_config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

async fn init_store() -> anyhow::Result<Arc<dyn PermissionStore>> {
    let db_config = DatabaseConfig::from_env();

    if db_config.url.is_none() {
        warn!("DATABASE_URL not set; using an empty in-memory permission store");
        return Ok(Arc::new(InMemoryPermissionStore::new()));
    }

    let pool = init_db_pool(&db_config)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to permission database");

    Ok(Arc::new(PgPermissionStore::new(pool)))
}

async fn init_shared_cache() -> Option<RedisCache> {
    let config = CacheConfig::from_env();
    if !config.enabled {
        info!("Shared scope cache disabled");
        return None;
    }

    match RedisCache::new(&config.redis_url).await {
        Ok(cache) => {
            info!("Connected to Redis scope cache");
            Some(cache)
        }
        Err(e) => {
            warn!(error = %e, "Redis unavailable; using the in-process scope cache only");
            None
        }
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let store = init_store().await?;
    let shared_cache = init_shared_cache().await;
    let authz = Authorizer::new(store, &AuthzConfig::from_env(), shared_cache);

    Ok(AppState::new(
        Arc::new(authz),
        JwtConfig::from_env(),
        CorsConfig::from_env(),
    ))
}
