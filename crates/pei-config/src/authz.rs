//! Permission engine configuration.
//!
//! # Environment Variables
//!
//! - `SCOPE_CACHE_TTL_SECONDS`: how long a resolved role/scope is reused (default: `300`)
//! - `FIELD_RULES_TTL_SECONDS`: how long field visibility rules are reused (default: `3600`)
//! - `PERMISSION_LOOKUP_TIMEOUT_MS`: bound on every profile/guardian-link lookup (default: `2000`)

use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthzConfig {
    pub scope_cache_ttl: Duration,
    pub field_rules_ttl: Duration,
    /// A lookup that has not answered within this bound is treated as failed,
    /// so the check resolves to an indeterminate deny.
    pub lookup_timeout: Duration,
}

impl AuthzConfig {
    pub fn from_env() -> Self {
        Self {
            scope_cache_ttl: Duration::from_secs(crate::env_or("SCOPE_CACHE_TTL_SECONDS", 300)),
            field_rules_ttl: Duration::from_secs(crate::env_or("FIELD_RULES_TTL_SECONDS", 3600)),
            lookup_timeout: Duration::from_millis(crate::env_or(
                "PERMISSION_LOOKUP_TIMEOUT_MS",
                2000,
            )),
        }
    }
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            scope_cache_ttl: Duration::from_secs(300),
            field_rules_ttl: Duration::from_secs(3600),
            lookup_timeout: Duration::from_millis(2000),
        }
    }
}
