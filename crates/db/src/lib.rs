//! Storage gateway over a pooled SQLite store.
//!
//! Every call checks one connection out of the pool, runs exactly one statement and hands the
//! connection back when the guard drops, on success and failure alike.

use std::str::FromStr;
use std::time::Duration;

use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::Migration;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Sqlite, SqlitePool};

pub mod error;
pub mod statement;

pub use error::StoreError;
pub use sqlx;
pub use statement::{Outcome, Param, Statement};

/// Handle to the connection pool. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the pool described by `settings`, failing if the store cannot be reached.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&settings.url)
            .map_err(StoreError::Unavailable)?
            .create_if_missing(settings.create_if_missing);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms))
            .connect_with(options)
            .await
            .map_err(StoreError::Unavailable)?;

        tracing::info!(
            target: "bookshelf-db",
            url = %settings.url,
            max_connections = settings.max_connections,
            "connection pool ready"
        );

        Ok(Self { pool })
    }

    /// Run a query and map every returned row.
    pub async fn fetch_all<T>(&self, statement: Statement) -> Result<Vec<T>, StoreError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let (sql, arguments) = statement.into_parts()?;
        let mut conn = self.acquire().await?;

        let rows = sqlx::query_as_with::<_, T, _>(sql, arguments)
            .fetch_all(&mut *conn)
            .await
            .map_err(StoreError::Statement)?;

        tracing::debug!(target: "bookshelf-db", statement = sql, rows = rows.len(), "query executed");
        Ok(rows)
    }

    /// Run a mutation. The single statement is committed on its own.
    pub async fn execute(&self, statement: Statement) -> Result<Outcome, StoreError> {
        let (sql, arguments) = statement.into_parts()?;
        let mut conn = self.acquire().await?;

        let result = sqlx::query_with(sql, arguments)
            .execute(&mut *conn)
            .await
            .map_err(StoreError::Statement)?;

        let outcome = Outcome {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_rowid(),
        };
        tracing::debug!(
            target: "bookshelf-db",
            statement = sql,
            rows_affected = outcome.rows_affected,
            "statement executed"
        );
        Ok(outcome)
    }

    /// Replay module bootstrap DDL in the given order.
    pub async fn apply_migrations(
        &self,
        migrations: &[(String, Migration)],
    ) -> Result<(), StoreError> {
        let mut conn = self.acquire().await?;

        for (module, migration) in migrations {
            sqlx::raw_sql(migration.up)
                .execute(&mut *conn)
                .await
                .map_err(StoreError::Statement)?;

            tracing::info!(
                target: "bookshelf-db",
                module = %module,
                migration = migration.id,
                "migration applied"
            );
        }

        Ok(())
    }

    /// Wait for checked-out connections to come back, then close them all.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!(target: "bookshelf-db", "connection pool closed");
    }

    async fn acquire(&self) -> Result<PoolConnection<Sqlite>, StoreError> {
        self.pool.acquire().await.map_err(StoreError::Unavailable)
    }
}
