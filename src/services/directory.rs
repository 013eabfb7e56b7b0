//! Storage capability traits consumed by the services.
//!
//! Each directory owns its records. Implementations exist for SQLite
//! (`crate::db`) and in memory (`super::memory`).

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{PullRequest, PullRequestShort, ReviewerStat, Team, User};

/// Errors reported by a directory implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed record does not exist (or vanished before the write).
    #[error("record not found")]
    NotFound,

    /// A record with the same identity already exists.
    #[error("record already exists")]
    AlreadyExists,

    /// A stored value could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("SQLite error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Map SQLite constraint failures onto the directory error kinds.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::AlreadyExists,
            _ => Self::Database(err),
        }
    }
}

/// User lookup, listing and activation.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_by_id(&self, user_id: &str) -> Result<User, StoreError>;

    /// Members of `team_name` ordered by user id, optionally active only.
    async fn list_by_team(&self, team_name: &str, only_active: bool)
        -> Result<Vec<User>, StoreError>;

    /// Flip a user's active flag and return the updated user.
    async fn set_active(&self, user_id: &str, is_active: bool) -> Result<User, StoreError>;

    /// Insert or update every user; all-or-nothing.
    async fn bulk_upsert(&self, users: &[User]) -> Result<(), StoreError>;
}

/// Team lookup and creation.
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    async fn get_by_name(&self, team_name: &str) -> Result<Team, StoreError>;

    /// Create a team. Fails with `AlreadyExists` if the name is taken.
    async fn create(&self, team: &Team) -> Result<(), StoreError>;
}

/// Pull request persistence and reviewer aggregation.
#[async_trait]
pub trait PullRequestStore: Send + Sync {
    /// Fails with `AlreadyExists` on an id collision.
    async fn create(&self, pr: &PullRequest) -> Result<(), StoreError>;

    async fn get_by_id(&self, pull_request_id: &str) -> Result<PullRequest, StoreError>;

    /// Overwrite an existing pull request. Fails with `NotFound` if it is gone.
    ///
    /// MERGED is terminal: a stored MERGED status and a stored `merged_at`
    /// are kept even if `pr` carries other values.
    async fn update(&self, pr: &PullRequest) -> Result<(), StoreError>;

    /// Pull requests where `user_id` is an assigned reviewer, ordered by id.
    async fn list_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestShort>, StoreError>;

    /// Review counts per reviewer across all pull requests, ordered by user id.
    async fn reviewer_stats(&self) -> Result<Vec<ReviewerStat>, StoreError>;
}
