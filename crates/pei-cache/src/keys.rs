//! Cache key generation and invalidation helpers.

use crate::RedisCache;
use tracing::warn;
use uuid::Uuid;

/// Prefix for all cache keys to avoid collisions with other Redis users.
const CACHE_PREFIX: &str = "pei";

fn build_key(parts: &[&str]) -> String {
    format!("{}:{}", CACHE_PREFIX, parts.join(":"))
}

/// Keys for resolved actor scopes (roles + tenant/school).
pub mod scopes {
    use super::*;

    pub fn by_user(user_id: Uuid) -> String {
        build_key(&["scope", &user_id.to_string()])
    }

    /// Matches every cached scope.
    pub fn invalidation_pattern() -> String {
        format!("{}:scope:*", CACHE_PREFIX)
    }
}

/// Shared-tier invalidation. Failures are logged and swallowed: the entries
/// still expire with their TTL.
pub mod invalidate {
    use super::*;

    /// Call after a user's roles, tenant or school change.
    pub async fn user_scope(cache: Option<&RedisCache>, user_id: Uuid) {
        let Some(cache) = cache else { return };

        if let Err(e) = cache.invalidate(&scopes::by_user(user_id)).await {
            warn!(error = %e, user_id = %user_id, "Failed to invalidate user scope cache");
        }
    }

    /// Call after a bulk change such as moving a school to another tenant.
    pub async fn all_scopes(cache: Option<&RedisCache>) {
        let Some(cache) = cache else { return };

        if let Err(e) = cache
            .invalidate_pattern(&scopes::invalidation_pattern())
            .await
        {
            warn!(error = %e, "Failed to invalidate scope caches");
        }
    }
}
