use crate::DbError;
use crate::pool::ClientPool;
use async_trait::async_trait;
use core_types::{Client, ClientInput};
use sqlx::Connection;

/// The operations the web layer needs from client storage.
///
/// Every method borrows at most one connection for its own duration and has
/// returned it by the time the future completes, whatever the outcome.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// All clients, newest (highest id) first.
    async fn list_clients(&self) -> Result<Vec<Client>, DbError>;

    async fn get_client(&self, id: i64) -> Result<Client, DbError>;

    /// Inserts a client and returns it with its assigned id.
    async fn create_client(&self, input: &ClientInput) -> Result<Client, DbError>;

    /// Overwrites name and balance of `id`. `DbError::NotFound` if no such row.
    async fn update_client(&self, id: i64, input: &ClientInput) -> Result<Client, DbError>;

    /// Removes exactly the row `id`. `DbError::NotFound` if no such row.
    async fn delete_client(&self, id: i64) -> Result<(), DbError>;
}

/// The `DbRepository` provides a high-level, application-specific interface
/// to the `clients` table. It encapsulates all SQL queries and data access logic.
///
/// Writes run in an explicit transaction on the borrowed connection. A
/// transaction that is dropped without `commit` (any `?` or early return)
/// is rolled back before the connection goes back to the pool.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: ClientPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: ClientPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &ClientPool {
        &self.pool
    }
}

#[async_trait]
impl ClientStore for DbRepository {
    async fn list_clients(&self) -> Result<Vec<Client>, DbError> {
        let mut conn = self.pool.acquire().await?;

        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, name, balance FROM clients ORDER BY id DESC",
        )
        .fetch_all(&mut *conn)
        .await?;

        tracing::debug!(count = clients.len(), "Listed clients.");
        Ok(clients)
    }

    async fn get_client(&self, id: i64) -> Result<Client, DbError> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query_as::<_, Client>("SELECT id, name, balance FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(DbError::NotFound)
    }

    async fn create_client(&self, input: &ClientInput) -> Result<Client, DbError> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let client = sqlx::query_as::<_, Client>(
            "INSERT INTO clients (name, balance) VALUES ($1, $2) RETURNING id, name, balance",
        )
        .bind(input.name())
        .bind(input.balance())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(client_id = client.id, "Client created.");
        Ok(client)
    }

    async fn update_client(&self, id: i64, input: &ClientInput) -> Result<Client, DbError> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let updated = sqlx::query_as::<_, Client>(
            "UPDATE clients SET name = $1, balance = $2 WHERE id = $3 RETURNING id, name, balance",
        )
        .bind(input.name())
        .bind(input.balance())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        // Zero rows matched: nothing to commit, the dropped transaction rolls back.
        let Some(client) = updated else {
            return Err(DbError::NotFound);
        };

        tx.commit().await?;

        tracing::debug!(client_id = id, "Client updated.");
        Ok(client)
    }

    async fn delete_client(&self, id: i64) -> Result<(), DbError> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        tx.commit().await?;

        tracing::debug!(client_id = id, "Client deleted.");
        Ok(())
    }
}
