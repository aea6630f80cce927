pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod models;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::auth::{AuthService, SqliteIdentityStore, TokenGenerator};
use crate::config::{AppConfig, ConfigError};
use crate::db::{DatabaseError, Store};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let result = AppConfig::from_env()
        .map_err(StartupError::from)
        .and_then(|config| {
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(serve(config))
        });

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

/// Open the store, wire the auth service and serve until Ctrl-C.
pub async fn serve(config: AppConfig) -> Result<(), StartupError> {
    let store = Store::open(&config.db_path)?;
    let auth = AuthService::new(
        store.clone(),
        Arc::new(SqliteIdentityStore::default()),
        TokenGenerator::new(config.jwt),
    );
    let app = api::api_router(store, auth);
    api::server::serve_until(config.bind_addr, app, api::server::ctrl_c()).await?;
    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
