//! Entry point tying resolver, evaluator and field rules together.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use pei_cache::RedisCache;
use pei_config::AuthzConfig;
use pei_models::{ActorScope, Decision, UserId};

use crate::error::{LookupFailure, bounded};
use crate::evaluator::{PermissionCheck, PermissionEvaluator, any_of};
use crate::field_mask::FieldMask;
use crate::policy::PolicyTable;
use crate::resolver::ScopeResolver;
use crate::store::PermissionStore;

/// Upper bound between reload attempts after a failed field rule load.
const FIELD_RULES_RETRY: Duration = Duration::from_secs(30);

struct FieldRulesState {
    mask: Arc<FieldMask>,
    next_refresh: Instant,
}

pub struct Authorizer {
    store: Arc<dyn PermissionStore>,
    resolver: ScopeResolver,
    evaluator: PermissionEvaluator,
    field_rules: RwLock<FieldRulesState>,
    field_rules_ttl: Duration,
    lookup_timeout: Duration,
}

impl Authorizer {
    pub fn new(
        store: Arc<dyn PermissionStore>,
        config: &AuthzConfig,
        shared_cache: Option<RedisCache>,
    ) -> Self {
        Self::with_policy(store, config, shared_cache, PolicyTable::default())
    }

    pub fn with_policy(
        store: Arc<dyn PermissionStore>,
        config: &AuthzConfig,
        shared_cache: Option<RedisCache>,
        policy: PolicyTable,
    ) -> Self {
        Self {
            resolver: ScopeResolver::new(store.clone(), config, shared_cache),
            evaluator: PermissionEvaluator::new(
                store.clone(),
                Arc::new(policy),
                config.lookup_timeout,
            ),
            store,
            field_rules: RwLock::new(FieldRulesState {
                mask: Arc::new(FieldMask::defaults()),
                next_refresh: Instant::now(),
            }),
            field_rules_ttl: config.field_rules_ttl,
            lookup_timeout: config.lookup_timeout,
        }
    }

    pub fn resolver(&self) -> &ScopeResolver {
        &self.resolver
    }

    pub fn evaluator(&self) -> &PermissionEvaluator {
        &self.evaluator
    }

    pub async fn resolve(&self, user_id: UserId) -> Result<ActorScope, LookupFailure> {
        self.resolver.resolve(user_id).await
    }

    /// Resolves `user_id` and evaluates `check` against it. A failed scope
    /// lookup is an indeterminate decision.
    #[instrument(skip(self, check), fields(user_id = %user_id))]
    pub async fn check_for_user(&self, user_id: UserId, check: &PermissionCheck) -> Decision {
        match self.resolver.resolve(user_id).await {
            Ok(actor) => self.evaluator.check(&actor, check).await,
            Err(e) => Decision::indeterminate(e.to_string()),
        }
    }

    pub async fn check_all_for_user(
        &self,
        user_id: UserId,
        checks: &[PermissionCheck],
    ) -> Vec<Decision> {
        match self.resolver.resolve(user_id).await {
            Ok(actor) => self.evaluator.can_all(&actor, checks).await,
            Err(e) => {
                let detail = e.to_string();
                checks
                    .iter()
                    .map(|_| Decision::indeterminate(detail.clone()))
                    .collect()
            }
        }
    }

    pub async fn check_any_for_user(&self, user_id: UserId, checks: &[PermissionCheck]) -> Decision {
        any_of(self.check_all_for_user(user_id, checks).await)
    }

    /// The current field rules, reloaded from the store once their TTL is up.
    ///
    /// Until the first successful load the built-in defaults apply. A failed
    /// reload keeps the last good rules and is retried after a short delay.
    pub async fn field_mask(&self) -> Arc<FieldMask> {
        {
            let state = self.field_rules.read().await;
            if Instant::now() < state.next_refresh {
                return state.mask.clone();
            }
        }

        let mut state = self.field_rules.write().await;
        // Another task may have reloaded while we waited for the lock.
        if Instant::now() < state.next_refresh {
            return state.mask.clone();
        }

        match self.load_field_rules().await {
            Ok(mask) => {
                info!(rules = mask.len(), "Field visibility rules loaded");
                state.mask = Arc::new(mask);
                state.next_refresh = Instant::now() + self.field_rules_ttl;
            }
            Err(e) => {
                warn!(error = %e, "Keeping previous field visibility rules");
                state.next_refresh = Instant::now() + self.field_rules_ttl.min(FIELD_RULES_RETRY);
            }
        }

        state.mask.clone()
    }

    /// Forces the next [`Authorizer::field_mask`] call to reload.
    pub async fn expire_field_rules(&self) {
        self.field_rules.write().await.next_refresh = Instant::now();
    }

    async fn load_field_rules(&self) -> Result<FieldMask, LookupFailure> {
        let rules = bounded(
            "field_visibility_rules",
            self.lookup_timeout,
            self.store.field_visibility_rules(),
        )
        .await?;
        Ok(FieldMask::from_rules(rules))
    }

    pub async fn invalidate_user(&self, user_id: UserId) {
        self.resolver.invalidate(user_id).await;
    }
}
