pub mod api;
pub mod assist;
pub mod auth;
pub mod config;
pub mod db;
pub mod models;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve configuration, prepare the database, then serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env()?;

    // Migrations run on open; fail fast before binding.
    drop(db::open_database(&config.db_path)?);
    tracing::info!(path = %config.db_path.display(), "database ready");

    if !config.llm.is_complete() {
        tracing::debug!(llm = ?config.llm, "language model not fully configured; assist will fall back");
    }

    let addr = config.bind_addr;
    api::serve(api::ApiContext::new(config), addr).await?;
    Ok(())
}
