use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use advisor_agent::llm::LlmError;
use advisor_agent::{AdvisorRuntime, OpenAiClient};
use advisor_core::audit::TracingAuditSink;
use advisor_core::config::{AppConfig, ConfigError, LoadOptions};
use advisor_index::{connect, migrations, DbPool, SqlDocumentIndex};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub index: Arc<SqlDocumentIndex>,
    pub advisor: Arc<AdvisorRuntime>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("llm client initialization failed: {0}")]
    Llm(#[source] LlmError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    let summary = migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        applied = summary.applied,
        total = summary.total,
        "database migrations applied"
    );

    let index = Arc::new(SqlDocumentIndex::new(db_pool.clone()));
    let llm = Arc::new(OpenAiClient::from_config(&config.llm).map_err(BootstrapError::Llm)?);
    let advisor =
        Arc::new(AdvisorRuntime::new(llm, index.clone(), Arc::new(TracingAuditSink)));

    Ok(Application { config, db_pool, index, advisor })
}
