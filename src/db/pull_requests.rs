//! SQLite pull request store.
//!
//! `assigned_reviewers` is stored as a JSON array and queried with
//! `json_each` for reviewer listings and statistics.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::db::pool::DbPool;
use crate::models::{PullRequest, PullRequestShort, PullRequestStatus, ReviewerStat};
use crate::services::directory::{PullRequestStore, StoreError};

/// Raw `pull_requests` row.
#[derive(Debug, FromRow)]
struct PullRequestRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
    assigned_reviewers: String,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
}

impl TryFrom<PullRequestRow> for PullRequest {
    type Error = StoreError;

    fn try_from(row: PullRequestRow) -> Result<Self, Self::Error> {
        let status = PullRequestStatus::try_from(row.status.as_str()).map_err(StoreError::Corrupt)?;
        let assigned_reviewers: Vec<String> = serde_json::from_str(&row.assigned_reviewers)
            .map_err(|e| {
                StoreError::Corrupt(format!(
                    "assigned_reviewers of {}: {}",
                    row.pull_request_id, e
                ))
            })?;

        Ok(Self {
            pull_request_id: row.pull_request_id,
            pull_request_name: row.pull_request_name,
            author_id: row.author_id,
            status,
            assigned_reviewers,
            created_at: row.created_at,
            merged_at: row.merged_at,
        })
    }
}

fn reviewers_json(pr: &PullRequest) -> Result<String, StoreError> {
    serde_json::to_string(&pr.assigned_reviewers).map_err(|e| StoreError::Corrupt(e.to_string()))
}

pub struct SqlitePullRequestStore {
    pool: DbPool,
}

impl SqlitePullRequestStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PullRequestStore for SqlitePullRequestStore {
    async fn create(&self, pr: &PullRequest) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO pull_requests (
                pull_request_id, pull_request_name, author_id, status,
                assigned_reviewers, created_at, merged_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&pr.pull_request_id)
        .bind(&pr.pull_request_name)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(reviewers_json(pr)?)
        .bind(pr.created_at)
        .bind(pr.merged_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(())
    }

    async fn get_by_id(&self, pull_request_id: &str) -> Result<PullRequest, StoreError> {
        let row = sqlx::query_as::<_, PullRequestRow>(
            r#"
            SELECT pull_request_id, pull_request_name, author_id, status,
                   assigned_reviewers, created_at, merged_at
            FROM pull_requests
            WHERE pull_request_id = ?
            "#,
        )
        .bind(pull_request_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        PullRequest::try_from(row)
    }

    async fn update(&self, pr: &PullRequest) -> Result<(), StoreError> {
        // Status and merged_at are written together; neither leaves MERGED.
        let result = sqlx::query(
            r#"
            UPDATE pull_requests
            SET pull_request_name = ?,
                author_id = ?,
                status = CASE WHEN status = 'MERGED' THEN status ELSE ? END,
                assigned_reviewers = ?,
                created_at = ?,
                merged_at = COALESCE(merged_at, ?)
            WHERE pull_request_id = ?
            "#,
        )
        .bind(&pr.pull_request_name)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(reviewers_json(pr)?)
        .bind(pr.created_at)
        .bind(pr.merged_at)
        .bind(&pr.pull_request_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn list_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestShort>, StoreError> {
        let rows: Vec<(String, String, String, String)> = sqlx::query_as(
            r#"
            SELECT p.pull_request_id, p.pull_request_name, p.author_id, p.status
            FROM pull_requests p
            WHERE EXISTS (
                SELECT 1 FROM json_each(p.assigned_reviewers) r WHERE r.value = ?
            )
            ORDER BY p.pull_request_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(pull_request_id, pull_request_name, author_id, status)| {
                Ok(PullRequestShort {
                    pull_request_id,
                    pull_request_name,
                    author_id,
                    status: PullRequestStatus::try_from(status.as_str())
                        .map_err(StoreError::Corrupt)?,
                })
            })
            .collect()
    }

    async fn reviewer_stats(&self) -> Result<Vec<ReviewerStat>, StoreError> {
        let stats = sqlx::query_as::<_, ReviewerStat>(
            r#"
            SELECT CAST(r.value AS TEXT) AS user_id, COUNT(*) AS review_count
            FROM pull_requests p, json_each(p.assigned_reviewers) r
            GROUP BY r.value
            ORDER BY r.value
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }
}
