//! Connection pool setup.

use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::Config;
use crate::error::AppResult;

/// Open the connection pool.
///
/// Connect and acquire timeouts come from the config so a storage outage
/// surfaces as a connection error instead of a hung request.
///
/// # Errors
///
/// Returns `AppError::Connection` when the database cannot be reached.
pub async fn connect(config: &Config) -> AppResult<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.db_pool_max)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(config.db_connect_timeout_seconds))
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_seconds))
        .sqlx_logging(false);

    Ok(Database::connect(options).await?)
}

/// Bring the schema up to date.
///
/// # Errors
///
/// Returns an error if any migration fails.
pub async fn migrate(db: &DatabaseConnection) -> AppResult<()> {
    Migrator::up(db, None).await?;
    Ok(())
}
