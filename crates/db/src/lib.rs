//! SQLite connection pool and schema bootstrap.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use shelf_kernel::settings::DatabaseSettings;
use shelf_kernel::Schema;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;

/// Handle to the application database
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a pool for the configured database, creating the file if needed.
    ///
    /// In-memory databases are private to a connection, so their pool is
    /// pinned to one connection that is never recycled.
    pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        let connect_opts = SqliteConnectOptions::from_str(&settings.url)
            .with_context(|| format!("invalid database url '{}'", settings.url))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .disable_statement_logging();

        let mut pool_opts = SqlitePoolOptions::new()
            .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms));

        pool_opts = if settings.is_in_memory() {
            pool_opts
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            pool_opts.max_connections(settings.max_connections)
        };

        let pool = pool_opts
            .connect_with(connect_opts)
            .await
            .with_context(|| format!("failed to connect to database '{}'", settings.url))?;

        tracing::info!(
            target: "shelf-db",
            url = %settings.url,
            in_memory = settings.is_in_memory(),
            "database pool ready"
        );

        Ok(Self { pool })
    }

    /// Apply module table definitions in the given order.
    pub async fn apply_schemas(&self, schemas: &[(String, Schema)]) -> anyhow::Result<()> {
        for (module, schema) in schemas {
            tracing::info!(target: "shelf-db", module = %module, schema = schema.id, "applying schema");

            sqlx::query(schema.ddl)
                .execute(&self.pool)
                .await
                .with_context(|| format!("failed to apply schema '{}' of module '{}'", schema.id, module))?;
        }

        Ok(())
    }

    /// Get reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for checked-out connections to be returned
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!(target: "shelf-db", "database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(id: &'static str, ddl: &'static str) -> (String, Schema) {
        ("test".to_string(), Schema { id, ddl })
    }

    #[tokio::test]
    async fn in_memory_database_keeps_state_across_queries() {
        let db = Database::connect(&DatabaseSettings::in_memory()).await.unwrap();
        db.apply_schemas(&[schema(
            "001_table",
            "CREATE TABLE IF NOT EXISTS notes (id TEXT PRIMARY KEY);",
        )])
        .await
        .unwrap();

        sqlx::query("INSERT INTO notes (id) VALUES ('a')")
            .execute(db.pool())
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn schemas_are_idempotent() {
        let db = Database::connect(&DatabaseSettings::in_memory()).await.unwrap();
        let schemas = [schema(
            "001_table",
            "CREATE TABLE IF NOT EXISTS notes (id TEXT PRIMARY KEY);",
        )];

        db.apply_schemas(&schemas).await.unwrap();
        db.apply_schemas(&schemas).await.unwrap();
    }

    #[tokio::test]
    async fn broken_schema_names_its_module() {
        let db = Database::connect(&DatabaseSettings::in_memory()).await.unwrap();
        let err = db
            .apply_schemas(&[schema("001_broken", "CREATE TABLEX nonsense;")])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("001_broken"));
    }
}
