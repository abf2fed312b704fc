//! Metadata store setup and initialization

use anyhow::{Context, Result};
use resizer_core::{Config, LogEvent, MetadataBackend};
use resizer_db::{CacheStore, MemoryCacheStore, PostgresCacheRepository};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Build the metadata store selected by `METADATA_BACKEND`.
pub async fn setup_metadata_store(config: &Config) -> Result<Arc<dyn CacheStore>> {
    match config.metadata_backend() {
        MetadataBackend::Memory => {
            tracing::info!("Using in-memory metadata store");
            Ok(Arc::new(MemoryCacheStore::new()))
        }
        MetadataBackend::Postgres => {
            let pool = setup_database(config).await?;
            Ok(Arc::new(PostgresCacheRepository::new(pool)))
        }
    }
}

/// Connect to PostgreSQL, waiting for it to come up, and run migrations.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let url = config
        .database_url()
        .context("DATABASE_URL must be set when using the postgres metadata backend")?;

    tracing::info!(event = %LogEvent::DatabaseInitializing, "Connecting to database...");
    let pool = connect_with_retry(config, url).await?;
    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected successfully"
    );

    // Run pending migrations on startup (path: workspace migrations/ from crate root)
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

async fn connect_with_retry(config: &Config, url: &str) -> Result<PgPool> {
    let mut attempt = 1;
    loop {
        let result = PgPoolOptions::new()
            .max_connections(config.db_max_connections())
            .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(url)
            .await;

        match result {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                tracing::warn!(
                    event = %LogEvent::DatabaseInitializing,
                    attempt = attempt,
                    max_attempts = CONNECT_ATTEMPTS,
                    error = %e,
                    "Database not ready, retrying"
                );
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to connect to database after {} attempts", attempt)
                })
            }
        }
    }
}
