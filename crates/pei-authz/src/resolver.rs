//! Role & scope resolution with a two-tier cache.
//!
//! The local tier is an in-process TTL map and is always on. The shared tier
//! is Redis, used when configured, so a scope loaded by one instance is reused
//! by the others. An invalidation clears the local tier of the instance that
//! receives it and the shared tier; other instances keep their local copy
//! until `SCOPE_CACHE_TTL_SECONDS` runs out. Unknown users and failed lookups
//! are never cached.
//!
//! Every invalidation bumps a generation (per user, or a global epoch for
//! [`ScopeResolver::invalidate_all`]). A lookup that started before the bump
//! does not write its result back, so a scope read before a role change
//! cannot outlive the invalidation that followed it.

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use pei_cache::{MemoryCache, RedisCache, keys};
use pei_config::AuthzConfig;
use pei_models::{ActorScope, Role, UserId};
use pei_observability::track_scope_cache;
use tracing::{debug, info, instrument, warn};

use crate::error::{LookupFailure, bounded};
use crate::store::{PermissionStore, RoleScopeRecord};

pub struct ScopeResolver {
    store: Arc<dyn PermissionStore>,
    local: MemoryCache<UserId, ActorScope>,
    shared: Option<RedisCache>,
    lookup_timeout: Duration,
    generations: DashMap<UserId, u64>,
    epoch: AtomicU64,
}

/// Invalidation counters observed when a lookup started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Generation {
    epoch: u64,
    user: u64,
}

impl ScopeResolver {
    pub fn new(
        store: Arc<dyn PermissionStore>,
        config: &AuthzConfig,
        shared: Option<RedisCache>,
    ) -> Self {
        Self {
            store,
            local: MemoryCache::new(config.scope_cache_ttl),
            shared,
            lookup_timeout: config.lookup_timeout,
            generations: DashMap::new(),
            epoch: AtomicU64::new(0),
        }
    }

    fn generation(&self, user_id: UserId) -> Generation {
        Generation {
            epoch: self.epoch.load(Ordering::SeqCst),
            user: self.generations.get(&user_id).map_or(0, |g| *g),
        }
    }

    /// Stores `scope` in the local tier unless `user_id` was invalidated since
    /// `seen`. The check runs again after the insert: an invalidation landing
    /// between check and insert removes the entry here.
    fn cache_locally(&self, user_id: UserId, scope: &ActorScope, seen: Generation) -> bool {
        if self.generation(user_id) != seen {
            return false;
        }
        self.local.insert(user_id, scope.clone());
        if self.generation(user_id) != seen {
            self.local.invalidate(&user_id);
            return false;
        }
        true
    }

    /// TTL for the shared tier; `None` when scopes must not be cached.
    fn shared_ttl(&self) -> Option<Duration> {
        let ttl = self.local.ttl();
        (!ttl.is_zero()).then_some(ttl)
    }

    /// Resolves `user_id` to its roles and scope.
    ///
    /// A user without a profile resolves to an empty scope.
    ///
    /// # Errors
    ///
    /// Returns [`LookupFailure`] when the store errors or does not answer
    /// within the lookup timeout.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn resolve(&self, user_id: UserId) -> Result<ActorScope, LookupFailure> {
        if let Some(scope) = self.local.get(&user_id) {
            track_scope_cache("local_hit");
            return Ok(scope);
        }

        let seen = self.generation(user_id);
        let key = keys::scopes::by_user(user_id.into_inner());

        if let Some(shared) = &self.shared {
            if let Some(scope) = shared.get::<ActorScope>(&key).await {
                track_scope_cache("shared_hit");
                self.cache_locally(user_id, &scope, seen);
                return Ok(scope);
            }
        }

        track_scope_cache("miss");

        let record = bounded(
            "roles_and_scope",
            self.lookup_timeout,
            self.store.roles_and_scope(user_id),
        )
        .await?;

        let Some(record) = record else {
            debug!("No profile for user, resolving to empty scope");
            return Ok(ActorScope::empty(user_id));
        };

        let scope = scope_from_record(user_id, record);
        if !self.cache_locally(user_id, &scope, seen) {
            debug!("Scope invalidated during lookup, not caching");
            return Ok(scope);
        }

        if let (Some(shared), Some(ttl)) = (&self.shared, self.shared_ttl()) {
            if let Err(e) = shared.set_with_ttl(&key, &scope, ttl).await {
                warn!(error = %e, "Failed to cache scope in Redis");
            }
            // An invalidation may have deleted the key before our write landed.
            if self.generation(user_id) != seen {
                if let Err(e) = shared.invalidate(&key).await {
                    warn!(error = %e, "Failed to drop stale scope from Redis");
                }
            }
        }

        Ok(scope)
    }

    /// Drops `user_id` from both cache tiers. Call after role changes and
    /// tenant or school reassignment.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn invalidate(&self, user_id: UserId) {
        *self.generations.entry(user_id).or_insert(0) += 1;
        self.local.invalidate(&user_id);
        keys::invalidate::user_scope(self.shared.as_ref(), user_id.into_inner()).await;
        info!("Scope cache invalidated");
    }

    pub async fn invalidate_all(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.local.clear();
        keys::invalidate::all_scopes(self.shared.as_ref()).await;
        info!("All scope caches invalidated");
    }

    /// Number of scopes held in the local tier, expired ones included.
    pub fn cached_len(&self) -> usize {
        self.local.len()
    }

    /// Drops expired local entries.
    pub fn purge_expired(&self) -> usize {
        self.local.purge_expired()
    }
}

fn scope_from_record(user_id: UserId, record: RoleScopeRecord) -> ActorScope {
    let roles = record.roles.iter().filter_map(|tag| match tag.parse::<Role>() {
        Ok(role) => Some(role),
        Err(e) => {
            warn!(user_id = %user_id, role = %tag, error = %e, "Ignoring unknown role tag");
            None
        }
    });

    ActorScope::new(user_id, roles, record.tenant_id, record.school_id)
}
