//! Redis cache configuration.

use std::env;

/// Shared cache configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `CACHE_ENABLED`: set to `false` or `0` to run with the in-process tier only (default: enabled)
/// - `REDIS_URL`: Redis connection URL (default: `redis://127.0.0.1:6379`)
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub enabled: bool,
    pub redis_url: String,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: env::var("CACHE_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into()),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redis_url: "redis://127.0.0.1:6379".into(),
        }
    }
}
