//! Pull request reviewer assignment service.
//!
//! Assigns reviewers to new pull requests from the author's team, swaps
//! reviewers on request and tracks merge state. Storage sits behind the
//! directory traits in [`services::directory`], backed by SQLite or memory.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

use std::sync::Arc;

use config::Config;
use db::{SqlitePullRequestStore, SqliteTeamDirectory, SqliteUserDirectory};
use error::AppError;
use services::memory::{InMemoryPullRequestStore, InMemoryTeamDirectory, InMemoryUserDirectory};
use services::server::AppState;

/// Build the application state from configuration.
///
/// Uses SQLite when a database path is configured and the in-memory
/// directories otherwise.
pub async fn build_state(config: &Config) -> Result<AppState, AppError> {
    match &config.database_path {
        Some(path) => {
            let pool = db::initialize_with(path, config.pool_settings()).await?;
            Ok(AppState::new(
                Arc::new(SqliteUserDirectory::new(pool.clone())),
                Arc::new(SqliteTeamDirectory::new(pool.clone())),
                Arc::new(SqlitePullRequestStore::new(pool)),
            ))
        }
        None => {
            log::warn!("DATABASE_PATH not set; data is kept in memory only");
            Ok(AppState::new(
                Arc::new(InMemoryUserDirectory::new()),
                Arc::new(InMemoryTeamDirectory::new()),
                Arc::new(InMemoryPullRequestStore::new()),
            ))
        }
    }
}
