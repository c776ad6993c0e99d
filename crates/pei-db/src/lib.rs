//! # PEI DB
//!
//! Postgres connection pool and the [`PgPermissionStore`].
//!
//! # Example
//!
//! ```ignore
//! use pei_db::{PgPermissionStore, init_db_pool};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
//! let store = PgPermissionStore::new(pool);
//! ```

pub mod store;

pub use sqlx::PgPool;
pub use store::PgPermissionStore;

use pei_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Connects to Postgres and, when configured, applies the bundled migrations.
///
/// # Errors
///
/// Returns an error when `DATABASE_URL` is unset, the database cannot be
/// reached, or a migration fails.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| sqlx::Error::Configuration("DATABASE_URL must be set".into()))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await?;

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
    }

    Ok(pool)
}
