//! Database connection pool management

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use bookshelf_kernel::settings::DatabaseSettings;

/// Default maximum connections for the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Create a PostgreSQL connection pool.
///
/// # Errors
///
/// Returns an error if the connection fails.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Create a PostgreSQL connection pool with custom options.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Connect using the database section of the settings.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    tracing::info!(
        target: "bookshelf-db",
        url = %settings.redacted_url(),
        max_connections = settings.max_connections,
        "connecting to database"
    );

    create_pool_with_options(&settings.url, settings.max_connections)
        .await
        .with_context(|| format!("failed to connect to {}", settings.redacted_url()))
}
