use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// The URL and pool limits come from [`DatabaseSettings`] (the `DATABASE_URL`
/// environment variable overrides the configured URL). The pool is shared
/// across every request handler.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    if settings.url.trim().is_empty() {
        return Err(DbError::ConnectionConfigError(
            "DATABASE_URL must be set.".to_string(),
        ));
    }

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect(&settings.url)
        .await?;

    tracing::info!(
        max_connections = settings.max_connections,
        "Connected to the database."
    );
    Ok(pool)
}

/// Applies the embedded migrations so the schema matches this build.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
