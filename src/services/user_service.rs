//! User operations: activation and review listing.

use std::sync::Arc;

use super::assignment::not_found_or_storage;
use super::directory::{PullRequestStore, UserDirectory};
use crate::error::AppError;
use crate::models::{PullRequestShort, User};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserDirectory>,
    prs: Arc<dyn PullRequestStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserDirectory>, prs: Arc<dyn PullRequestStore>) -> Self {
        Self { users, prs }
    }

    pub async fn set_is_active(&self, user_id: &str, is_active: bool) -> Result<User, AppError> {
        let user = self
            .users
            .set_active(user_id, is_active)
            .await
            .map_err(|e| not_found_or_storage(e, "user", user_id, "users.set_active"))?;

        log::info!("[user] {} is_active={}", user_id, is_active);
        Ok(user)
    }

    /// Pull requests the user is assigned to review.
    pub async fn get_review(&self, user_id: &str) -> Result<Vec<PullRequestShort>, AppError> {
        self.users
            .get_by_id(user_id)
            .await
            .map_err(|e| not_found_or_storage(e, "user", user_id, "users.get_by_id"))?;

        self.prs
            .list_by_reviewer(user_id)
            .await
            .map_err(|e| AppError::storage(e, "pull_requests.list_by_reviewer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PullRequest;
    use crate::services::memory::{InMemoryPullRequestStore, InMemoryUserDirectory};
    use chrono::Utc;

    async fn service() -> (Arc<InMemoryPullRequestStore>, UserService) {
        let users = Arc::new(InMemoryUserDirectory::new());
        users
            .bulk_upsert(&[
                User::new("u1", "Alice", "backend", true),
                User::new("u2", "Bob", "backend", true),
            ])
            .await
            .unwrap();
        let prs = Arc::new(InMemoryPullRequestStore::new());
        (prs.clone(), UserService::new(users, prs))
    }

    #[tokio::test]
    async fn test_set_is_active() {
        let (_, service) = service().await;

        let user = service.set_is_active("u2", false).await.unwrap();
        assert!(!user.is_active);
        assert_eq!(user.team_name, "backend");
    }

    #[tokio::test]
    async fn test_set_is_active_user_not_found() {
        let (_, service) = service().await;

        let err = service.set_is_active("ghost", true).await.unwrap_err();
        assert_eq!(err.code(), Some("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_get_review_lists_assigned_prs() {
        let (prs, service) = service().await;
        prs.create(&PullRequest::open(
            "pr-2",
            "b",
            "u1",
            vec!["u2".to_string()],
            Utc::now(),
        ))
        .await
        .unwrap();
        prs.create(&PullRequest::open("pr-1", "a", "u1", vec![], Utc::now()))
            .await
            .unwrap();

        let review = service.get_review("u2").await.unwrap();
        assert_eq!(review.len(), 1);
        assert_eq!(review[0].pull_request_id, "pr-2");

        assert!(service.get_review("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_review_user_not_found() {
        let (_, service) = service().await;

        let err = service.get_review("ghost").await.unwrap_err();
        assert_eq!(err.code(), Some("NOT_FOUND"));
    }
}
