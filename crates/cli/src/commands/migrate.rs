//! Applies the product index schema migrations and reports where the index
//! stands afterwards.

use advisor_index::{connect, migrations};

use super::{load_config, run_blocking, CommandResult, StageFailure, EXIT_DB, EXIT_MIGRATION};

pub fn run() -> CommandResult {
    let config = match load_config("migrate") {
        Ok(config) => config,
        Err(result) => return result,
    };

    run_blocking("migrate", async move {
        let pool = connect(&config.database)
            .await
            .map_err(|error| StageFailure::new("db_connectivity", error.to_string(), EXIT_DB))?;

        let summary = migrations::run_pending(&pool)
            .await
            .map_err(|error| StageFailure::new("migration", error.to_string(), EXIT_MIGRATION))?;
        pool.close().await;

        Ok(format!(
            "product index schema is current ({} of {} migrations applied)",
            summary.applied, summary.total
        ))
    })
}
