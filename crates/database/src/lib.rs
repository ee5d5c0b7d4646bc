//! # Tally Database Crate
//!
//! This crate acts as the application-specific interface to the PostgreSQL
//! database that holds client records.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. The rest of the application talks to the
//!   [`ClientStore`] trait and never sees a connection.
//! - **Bounded & Pooled:** Connections come from a [`ClientPool`] with a fixed
//!   size and a bounded acquire wait. A saturated pool fails fast with
//!   [`DbError::PoolExhausted`].
//! - **Scoped acquisition:** Connections and transactions are RAII guards, so
//!   they are released (and uncommitted work rolled back) on every exit path.
//!
//! ## Public API
//!
//! - `connect`: Builds the connection pool from the database settings.
//! - `run_migrations`: Applies the embedded schema migrations.
//! - `DbRepository`: The `ClientStore` implementation backed by the pool.
//! - `DbError`: The classified failures that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod pool;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{check_connection, connect, run_migrations};
pub use error::DbError;
pub use pool::{ClientPool, PoolBounds};
pub use repository::{ClientStore, DbRepository};
