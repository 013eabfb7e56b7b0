//! SQLite team directory.
//!
//! A team row only records the name; its members are the users whose
//! `team_name` points at it.

use async_trait::async_trait;

use crate::db::pool::DbPool;
use crate::models::{Team, TeamMember};
use crate::services::directory::{StoreError, TeamDirectory};

pub struct SqliteTeamDirectory {
    pool: DbPool,
}

impl SqliteTeamDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamDirectory for SqliteTeamDirectory {
    async fn get_by_name(&self, team_name: &str) -> Result<Team, StoreError> {
        let exists = sqlx::query("SELECT 1 FROM teams WHERE team_name = ?")
            .bind(team_name)
            .fetch_optional(&self.pool)
            .await?
            .is_some();

        if !exists {
            return Err(StoreError::NotFound);
        }

        let members = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT user_id, username, is_active
            FROM users
            WHERE team_name = ?
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(Team {
            team_name: team_name.to_string(),
            members,
        })
    }

    async fn create(&self, team: &Team) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO teams (team_name) VALUES (?)")
            .bind(&team.team_name)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;

        Ok(())
    }
}
