//! SQLite entity store.
//!
//! [`Database`] owns the connection pool and runs the embedded migrations.
//! Repository functions live in the submodules and take a plain
//! `&mut SqliteConnection`, so callers decide the transaction boundary:
//!
//! ```text
//! Synchronizer → pool.begin() → customers / tags / addresses / shops → commit
//! ```

pub mod addresses;
pub mod customers;
pub mod shops;
pub mod tags;

use std::str::FromStr;

use sqlx::migrate::MigrateError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

pub use addresses::CustomerAddress;
pub use customers::Customer;
pub use shops::Shop;
pub use tags::CustomerTag;

/// Shared handle to the entity store.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the SQLite database at `url`, creating the file if needed.
    ///
    /// An in-memory URL gets a single connection that is never recycled,
    /// because every SQLite connection opens its own private memory database.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let in_memory = url.contains(":memory:");

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await?;

        info!(in_memory, max_connections, "database_connected");

        Ok(Self { pool })
    }

    /// Apply the embedded schema migrations.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("database_migrated");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("database_closed");
    }
}

#[cfg(test)]
pub(crate) async fn memory_database() -> Database {
    let db = Database::connect("sqlite::memory:", 1)
        .await
        .expect("connect in-memory database");
    db.run_migrations().await.expect("run migrations");
    db
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_create_tables() {
        let db = memory_database().await;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' AND name NOT LIKE 'sqlite%' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        assert_eq!(
            tables,
            vec![
                "customer_addresses",
                "customer_tags",
                "customers",
                "customers_addresses",
                "customers_tags",
                "shops",
            ]
        );
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = memory_database().await;
        db.run_migrations().await.unwrap();
    }
}
