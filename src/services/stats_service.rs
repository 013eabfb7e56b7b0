//! Reviewer workload statistics.

use std::sync::Arc;

use super::directory::PullRequestStore;
use crate::error::AppError;
use crate::models::ReviewerStat;

#[derive(Clone)]
pub struct StatsService {
    prs: Arc<dyn PullRequestStore>,
}

impl StatsService {
    pub fn new(prs: Arc<dyn PullRequestStore>) -> Self {
        Self { prs }
    }

    /// Recomputed on every call from the stored pull requests.
    pub async fn reviewer_stats(&self) -> Result<Vec<ReviewerStat>, AppError> {
        self.prs
            .reviewer_stats()
            .await
            .map_err(|e| AppError::storage(e, "pull_requests.reviewer_stats"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Team, TeamMember};
    use crate::services::memory::{
        InMemoryPullRequestStore, InMemoryTeamDirectory, InMemoryUserDirectory,
    };
    use crate::services::AssignmentEngine;
    use crate::services::directory::{TeamDirectory, UserDirectory};

    #[tokio::test]
    async fn test_stats_match_assignments_after_reassign_and_merge() {
        let users = Arc::new(InMemoryUserDirectory::new());
        let teams = Arc::new(InMemoryTeamDirectory::new());
        let prs = Arc::new(InMemoryPullRequestStore::new());
        let team = Team {
            team_name: "backend".to_string(),
            members: ["u1", "u2", "u3", "u4"]
                .iter()
                .map(|id| TeamMember {
                    user_id: id.to_string(),
                    username: id.to_string(),
                    is_active: true,
                })
                .collect(),
        };
        teams.create(&team).await.unwrap();
        users.bulk_upsert(&team.member_users()).await.unwrap();

        let engine = AssignmentEngine::new(users, teams, prs.clone());
        let stats = StatsService::new(prs);

        engine.create("pr-1", "a", "u1").await.unwrap(); // u2, u3
        engine.create("pr-2", "b", "u2").await.unwrap(); // u1, u3
        engine.reassign("pr-2", "u3").await.unwrap(); // u1, u4
        engine.merge("pr-1").await.unwrap();

        let counts: Vec<(String, i64)> = stats
            .reviewer_stats()
            .await
            .unwrap()
            .into_iter()
            .map(|s| (s.user_id, s.review_count))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("u1".to_string(), 1),
                ("u2".to_string(), 1),
                ("u3".to_string(), 1),
                ("u4".to_string(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_store_has_no_stats() {
        let stats = StatsService::new(Arc::new(InMemoryPullRequestStore::new()));
        assert!(stats.reviewer_stats().await.unwrap().is_empty());
    }
}
