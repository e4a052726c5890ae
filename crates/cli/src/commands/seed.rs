//! Loads the demo product catalog into the index and verifies every product
//! arrived.

use advisor_index::{connect, migrations, DbPool, DemoCatalog, SqlDocumentIndex};

use super::{
    load_config, run_blocking, CommandResult, StageFailure, EXIT_DB, EXIT_MIGRATION, EXIT_SEED,
};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(result) => return result,
    };

    run_blocking("seed", async move {
        let pool = connect(&config.database)
            .await
            .map_err(|error| StageFailure::new("db_connectivity", error.to_string(), EXIT_DB))?;

        let outcome = seed_catalog(&pool).await;
        pool.close().await;
        outcome
    })
}

async fn seed_catalog(pool: &DbPool) -> Result<String, StageFailure> {
    migrations::run_pending(pool)
        .await
        .map_err(|error| StageFailure::new("migration", error.to_string(), EXIT_MIGRATION))?;

    let index = SqlDocumentIndex::new(pool.clone());
    DemoCatalog::load(&index)
        .await
        .map_err(|error| StageFailure::new("seed_execution", error.to_string(), EXIT_SEED))?;

    let missing = DemoCatalog::verify(&index)
        .await
        .map_err(|error| StageFailure::new("seed_verification", error.to_string(), EXIT_SEED))?;
    if missing.is_empty() {
        Ok(format!(
            "demo catalog loaded and verified ({} products)",
            DemoCatalog::product_count()
        ))
    } else {
        let ids: Vec<String> = missing.iter().map(|id| id.to_string()).collect();
        Err(StageFailure::new(
            "seed_verification",
            format!("seed verification failed for products: {}", ids.join(", ")),
            EXIT_SEED,
        ))
    }
}
