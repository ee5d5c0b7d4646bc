use crate::error::DbError;
use crate::pool::{ClientPool, PoolBounds};
use configuration::DatabaseSettings;

/// Creates the application's connection pool from the database settings.
///
/// The pool is created lazily, so an unreachable database is reported on the
/// first request rather than at startup. Call [`run_migrations`] (or
/// [`check_connection`]) to surface it earlier.
pub fn connect(settings: &DatabaseSettings) -> Result<ClientPool, DbError> {
    let bounds = PoolBounds {
        min_connections: settings.min_connections,
        max_connections: settings.max_connections,
        acquire_timeout: settings.acquire_timeout(),
        idle_timeout: settings.idle_timeout(),
    };
    let pool = ClientPool::connect_lazy(&settings.url, bounds)?;

    tracing::info!(
        min_connections = bounds.min_connections,
        max_connections = bounds.max_connections,
        acquire_timeout_secs = settings.acquire_timeout_secs,
        "Database pool configured."
    );
    Ok(pool)
}

/// Borrows and immediately returns one connection to prove the database is reachable.
pub async fn check_connection(pool: &ClientPool) -> Result<(), DbError> {
    let conn = pool.acquire().await?;
    drop(conn);
    Ok(())
}

/// Applies the embedded schema migrations.
///
/// This is useful for ensuring the database schema is up-to-date when the application starts,
/// which is especially important in production deployments.
pub async fn run_migrations(pool: &ClientPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool.as_pg_pool()).await?;
    tracing::info!("Database migrations applied.");
    Ok(())
}
