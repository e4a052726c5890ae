use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Migration state of the product index after a `run_pending` pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Migrations recorded as applied in this database.
    pub applied: usize,
    /// Migrations the binary ships.
    pub total: usize,
}

pub async fn run_pending(pool: &DbPool) -> Result<MigrationSummary, MigrateError> {
    MIGRATOR.run(pool).await?;

    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations").fetch_one(pool).await?;
    Ok(MigrationSummary { applied: applied as usize, total: MIGRATOR.iter().len() })
}
