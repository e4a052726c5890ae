use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use advisor_core::config::DatabaseConfig;

pub type DbPool = sqlx::SqlitePool;

/// How long a connection waits on a locked index before giving up. Seeding
/// rewrites whole products in one transaction; readers must outwait that.
const LOCK_WAIT: Duration = Duration::from_secs(5);

/// Opens the product index pool from the advisory database configuration.
///
/// A missing database file is created empty; the schema comes from the
/// migrator, never from here.
pub async fn connect(database: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&database.url, database.max_connections, database.timeout_secs).await
}

pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    // Foreign keys are load-bearing: product_chunk rows must never outlive
    // their product row.
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(LOCK_WAIT);

    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .connect_with(options)
        .await
}

#[cfg(test)]
mod tests {
    use advisor_core::config::DatabaseConfig;
    use tempfile::TempDir;

    use super::{connect, connect_with_settings};

    #[tokio::test]
    async fn missing_database_files_are_created() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("index.db");
        let database = DatabaseConfig {
            url: format!("sqlite://{}", path.display()),
            max_connections: 1,
            timeout_secs: 5,
        };

        let pool = connect(&database).await.expect("pool should connect");
        assert!(path.exists(), "database file should be created on first connect");
        pool.close().await;
    }

    #[tokio::test]
    async fn connections_enforce_foreign_keys() {
        let pool =
            connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool should connect");

        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .expect("pragma query");
        assert_eq!(enabled, 1);

        pool.close().await;
    }
}
