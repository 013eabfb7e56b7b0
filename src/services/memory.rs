//! In-memory directory implementations.
//!
//! Records live in ordered maps behind `RwLock`s and are lost on restart.
//! Ordering matches the SQLite directories (by id).

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::directory::{PullRequestStore, StoreError, TeamDirectory, UserDirectory};
use crate::models::{PullRequest, PullRequestShort, ReviewerStat, Team, User};

/// In-memory user directory keyed by user id.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<BTreeMap<String, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get_by_id(&self, user_id: &str) -> Result<User, StoreError> {
        let users = self.users.read().await;
        users.get(user_id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_by_team(
        &self,
        team_name: &str,
        only_active: bool,
    ) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| u.team_name == team_name)
            .filter(|u| !only_active || u.is_active)
            .cloned()
            .collect())
    }

    async fn set_active(&self, user_id: &str, is_active: bool) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(user_id).ok_or(StoreError::NotFound)?;
        user.is_active = is_active;
        Ok(user.clone())
    }

    async fn bulk_upsert(&self, batch: &[User]) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        for user in batch {
            users.insert(user.user_id.clone(), user.clone());
        }
        Ok(())
    }
}

/// In-memory team directory holding each team as given at creation.
#[derive(Default)]
pub struct InMemoryTeamDirectory {
    teams: RwLock<BTreeMap<String, Team>>,
}

impl InMemoryTeamDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TeamDirectory for InMemoryTeamDirectory {
    async fn get_by_name(&self, team_name: &str) -> Result<Team, StoreError> {
        let teams = self.teams.read().await;
        teams.get(team_name).cloned().ok_or(StoreError::NotFound)
    }

    async fn create(&self, team: &Team) -> Result<(), StoreError> {
        use std::collections::btree_map::Entry;

        let mut teams = self.teams.write().await;
        match teams.entry(team.team_name.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(team.clone());
                Ok(())
            }
        }
    }
}

/// In-memory pull request store keyed by pull request id.
#[derive(Default)]
pub struct InMemoryPullRequestStore {
    prs: RwLock<BTreeMap<String, PullRequest>>,
}

impl InMemoryPullRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PullRequestStore for InMemoryPullRequestStore {
    async fn create(&self, pr: &PullRequest) -> Result<(), StoreError> {
        use std::collections::btree_map::Entry;

        let mut prs = self.prs.write().await;
        match prs.entry(pr.pull_request_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(pr.clone());
                Ok(())
            }
        }
    }

    async fn get_by_id(&self, pull_request_id: &str) -> Result<PullRequest, StoreError> {
        let prs = self.prs.read().await;
        prs.get(pull_request_id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update(&self, pr: &PullRequest) -> Result<(), StoreError> {
        let mut prs = self.prs.write().await;
        let stored = prs
            .get_mut(&pr.pull_request_id)
            .ok_or(StoreError::NotFound)?;

        let merged_at = stored.merged_at.or(pr.merged_at);
        let status = if stored.is_merged() {
            stored.status
        } else {
            pr.status
        };
        *stored = PullRequest {
            status,
            merged_at,
            ..pr.clone()
        };
        Ok(())
    }

    async fn list_by_reviewer(&self, user_id: &str) -> Result<Vec<PullRequestShort>, StoreError> {
        let prs = self.prs.read().await;
        Ok(prs
            .values()
            .filter(|pr| pr.has_reviewer(user_id))
            .map(PullRequest::to_short)
            .collect())
    }

    async fn reviewer_stats(&self) -> Result<Vec<ReviewerStat>, StoreError> {
        let prs = self.prs.read().await;
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for reviewer in prs.values().flat_map(|pr| pr.assigned_reviewers.iter()) {
            *counts.entry(reviewer.as_str()).or_insert(0) += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(user_id, review_count)| ReviewerStat {
                user_id: user_id.to_string(),
                review_count,
            })
            .collect())
    }
}
