use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use shoptalk_agent::Router;
use shoptalk_core::catalog::Catalog;
use shoptalk_core::config::{AppConfig, ConfigError, LoadOptions};
use shoptalk_store::{connect, migrations, DbPool, SqlStateStore, StateStore};

use crate::chat::ChatState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub router: Arc<Router>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        database_url = %config.database.url,
        "starting application bootstrap"
    );

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let catalog = Arc::new(Catalog::demo());
    let store: Arc<dyn StateStore> =
        Arc::new(SqlStateStore::new(db_pool.clone(), Arc::clone(&catalog)));
    let router = Arc::new(Router::new(catalog, store));

    Ok(Application { config, db_pool, router })
}

impl Application {
    pub fn chat_state(&self) -> ChatState {
        ChatState { router: Arc::clone(&self.router) }
    }
}
