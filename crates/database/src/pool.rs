use crate::error::DbError;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, Postgres};
use std::str::FromStr;
use std::time::Duration;

/// A bounded pool of PostgreSQL connections.
///
/// Acquisition policy is a bounded wait: [`ClientPool::acquire`] waits at most
/// the configured acquire timeout for a free slot and then fails with
/// [`DbError::PoolExhausted`]. It never queues indefinitely.
///
/// There is no explicit release. The returned [`PoolConnection`] goes back to
/// the pool when it is dropped, on every exit path.
#[derive(Debug, Clone)]
pub struct ClientPool {
    inner: PgPool,
}

/// Size and timing bounds for a [`ClientPool`].
#[derive(Debug, Clone, Copy)]
pub struct PoolBounds {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl ClientPool {
    /// Builds the pool without opening any socket yet.
    ///
    /// Connections are established on first use; afterwards the pool's
    /// maintenance task keeps `min_connections` warm. Must be called from
    /// within a Tokio runtime.
    pub fn connect_lazy(url: &str, bounds: PoolBounds) -> Result<Self, DbError> {
        let options = PgConnectOptions::from_str(url)
            .map_err(|e| DbError::ConnectionConfigError(e.to_string()))?;

        let inner = PgPoolOptions::new()
            .min_connections(bounds.min_connections)
            .max_connections(bounds.max_connections)
            .acquire_timeout(bounds.acquire_timeout)
            .idle_timeout(bounds.idle_timeout)
            .connect_lazy_with(options);

        Ok(Self { inner })
    }

    /// Borrows a connection, waiting at most the acquire timeout.
    ///
    /// Every failure here is about reaching the database: a timeout means the
    /// pool is saturated (or the server keeps refusing), anything else is a
    /// connection error.
    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, DbError> {
        self.inner.acquire().await.map_err(|e| match e {
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            e => DbError::ConnectionError(e),
        })
    }

    /// Number of connections currently lent out.
    pub fn in_use(&self) -> u32 {
        let idle = u32::try_from(self.inner.num_idle()).unwrap_or(u32::MAX);
        self.inner.size().saturating_sub(idle)
    }

    /// Number of open connections, lent out or idle.
    pub fn size(&self) -> u32 {
        self.inner.size()
    }

    /// Closes every connection and refuses further acquisitions.
    pub async fn close(&self) {
        self.inner.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// The underlying sqlx pool, for migrations and ad-hoc maintenance queries.
    pub fn as_pg_pool(&self) -> &PgPool {
        &self.inner
    }
}
