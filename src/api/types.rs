//! Shared types for the API layer.

use std::sync::Arc;

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::assist::{ConfiguredGenerator, GeneratorSource};
use crate::config::AppConfig;
use crate::db;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<AppConfig>,
    pub generator: Arc<dyn GeneratorSource>,
}

impl ApiContext {
    /// Context whose generator is built from `config.llm` on each call.
    pub fn new(config: AppConfig) -> Self {
        let generator = Arc::new(ConfiguredGenerator::new(config.llm.clone()));
        Self::with_generator(config, generator)
    }

    pub fn with_generator(config: AppConfig, generator: Arc<dyn GeneratorSource>) -> Self {
        Self {
            config: Arc::new(config),
            generator,
        }
    }

    /// Open a connection for the current request.
    pub fn open_db(&self) -> Result<Connection, ApiError> {
        db::open_database(&self.config.db_path).map_err(ApiError::from)
    }

    pub fn response_language(&self) -> &str {
        &self.config.llm.response_language
    }
}

/// Authenticated user context, injected into request extensions
/// by the auth middleware after successful token validation.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: i64,
    pub username: String,
    pub token_hash: String,
}
