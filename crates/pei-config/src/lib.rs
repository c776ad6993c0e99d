//! # PEI Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: JWT verification settings
//! - [`cors`]: CORS allowed origins
//! - [`authz`]: permission engine tuning (cache TTLs, lookup timeout)
//! - [`server`]: bind address
//! - [`database`]: Postgres connection settings
//!
//! # Example
//!
//! ```ignore
//! use pei_config::{AuthzConfig, CorsConfig, JwtConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let authz_config = AuthzConfig::from_env();
//! ```

pub mod authz;
pub mod cors;
pub mod database;
pub mod jwt;
pub mod server;

pub use authz::AuthzConfig;
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;

/// Reads and parses an environment variable, falling back to `default` when it
/// is unset or unparsable.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
