pub mod memory;
pub mod payment_settings;
pub mod payments;

use std::path::Path;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{error, info};

use crate::config::Config;
use crate::error::AppError;

pub use payment_settings::PgPaymentSettingStore;
pub use payments::PgPaymentStore;

const UNIQUE_VIOLATION: &str = "23505";

pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .max_lifetime(Duration::from_secs(5 * 60))
        .connect(&config.database_url)
        .await?;
    info!("Successfully connected to PostgreSQL database");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool, dir: &Path) -> anyhow::Result<()> {
    let migrator = Migrator::new(dir).await?;
    migrator.run(pool).await?;
    info!("Database migrations completed");
    Ok(())
}

/// Translates a driver error into the application taxonomy. Raw driver text is
/// logged here and only travels on inside `Unexpected`, which is never shown to clients.
pub fn translate_error(err: sqlx::Error, entity: &str) -> AppError {
    match &err {
        sqlx::Error::RowNotFound => AppError::NotFound(format!("{} not found", entity)),
        sqlx::Error::PoolTimedOut => {
            AppError::Timeout("timed out waiting for a database connection".to_string())
        }
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            error!(
                code = UNIQUE_VIOLATION,
                constraint = ?db_err.constraint(),
                "Duplicate key violation"
            );
            AppError::DuplicateKey(format!("{} already exists", entity))
        }
        _ => {
            error!(error = %err, entity, "Postgres error occurred");
            AppError::Unexpected(err.to_string())
        }
    }
}
