use std::sync::Arc;

use crate::commands::CommandResult;
use shoptalk_agent::Router;
use shoptalk_core::catalog::Catalog;
use shoptalk_core::config::{AppConfig, LoadOptions};
use shoptalk_core::domain::session::SessionId;
use shoptalk_store::{connect, migrations, SqlStateStore, StateStore};

pub fn run(message: &str, session: Option<String>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "chat",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "chat",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let session = SessionId(session.unwrap_or_else(|| config.demo.session_id.clone()));

    let result = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let catalog = Arc::new(Catalog::demo());
        let store: Arc<dyn StateStore> =
            Arc::new(SqlStateStore::new(pool.clone(), Arc::clone(&catalog)));
        let router = Router::new(catalog, store);

        let reply = router
            .dispatch(&session, message)
            .await
            .map_err(|error| ("dispatch", error.to_string(), 5u8))?;

        pool.close().await;
        Ok::<String, (&'static str, String, u8)>(reply)
    });

    match result {
        Ok(reply) => CommandResult::success("chat", reply),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("chat", error_class, message, exit_code)
        }
    }
}
