//! # PEI Cache
//!
//! Caching for resolved actor scopes.
//!
//! Two tiers are provided:
//! - [`MemoryCache`]: per-process TTL map, always on
//! - [`RedisCache`]: optional shared tier, so a scope loaded by one replica is
//!   reused by the others. Replicas still hold their own local copy until it
//!   expires.
//!
//! # Example
//!
//! ```ignore
//! use pei_cache::{CacheConfig, MemoryCache, RedisCache, keys};
//!
//! let config = CacheConfig::from_env();
//! let redis = RedisCache::new(&config.redis_url).await?;
//! redis.set_with_ttl(&keys::scopes::by_user(user_id), &scope, ttl).await?;
//!
//! let local: MemoryCache<Uuid, ActorScope> = MemoryCache::new(ttl);
//! ```

pub mod config;
pub mod keys;
pub mod memory;
pub mod redis;

pub use config::CacheConfig;
pub use memory::MemoryCache;
pub use redis::{CacheError, RedisCache};
