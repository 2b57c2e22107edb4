mod bootstrap;
mod chat;
mod health;

use anyhow::Result;
use shoptalk_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use shoptalk_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.listening",
        bind_address = %address,
        session_id = %app.config.demo.session_id,
        "shoptalk server ready"
    );

    let router = chat::router(app.chat_state()).merge(health::router(app.db_pool.clone()));
    axum::serve(listener, router).await?;

    Ok(())
}
