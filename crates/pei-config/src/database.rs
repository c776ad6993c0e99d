//! Database configuration.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string. When unset the service runs
//!   on an empty in-memory store, which denies every check.
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: `10`)
//! - `DATABASE_RUN_MIGRATIONS`: apply the bundled migrations at startup (default: `false`)

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            max_connections: crate::env_or("DATABASE_MAX_CONNECTIONS", 10),
            run_migrations: crate::env_or("DATABASE_RUN_MIGRATIONS", false),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            run_migrations: false,
        }
    }
}
