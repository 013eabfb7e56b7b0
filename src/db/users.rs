//! SQLite user directory.

use async_trait::async_trait;

use crate::db::pool::DbPool;
use crate::models::User;
use crate::services::directory::{StoreError, UserDirectory};

pub struct SqliteUserDirectory {
    pool: DbPool,
}

impl SqliteUserDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for SqliteUserDirectory {
    async fn get_by_id(&self, user_id: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn list_by_team(
        &self,
        team_name: &str,
        only_active: bool,
    ) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, team_name, is_active
            FROM users
            WHERE team_name = ? AND (? = 0 OR is_active = 1)
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .bind(only_active)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn set_active(&self, user_id: &str, is_active: bool) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_active = ?
            WHERE user_id = ?
            RETURNING user_id, username, team_name, is_active
            "#,
        )
        .bind(is_active)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn bulk_upsert(&self, users: &[User]) -> Result<(), StoreError> {
        if users.is_empty() {
            return Ok(());
        }

        // Dropping the transaction on error rolls it back.
        let mut tx = self.pool.begin().await?;
        for user in users {
            sqlx::query(
                r#"
                INSERT INTO users (user_id, username, team_name, is_active)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (user_id) DO UPDATE SET
                    username = excluded.username,
                    team_name = excluded.team_name,
                    is_active = excluded.is_active
                "#,
            )
            .bind(&user.user_id)
            .bind(&user.username)
            .bind(&user.team_name)
            .bind(user.is_active)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        log::debug!("[db] Upserted {} users", users.len());
        Ok(())
    }
}
