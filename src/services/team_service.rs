//! Team operations: create, read, deactivate members.

use std::sync::Arc;

use super::assignment::not_found_or_storage;
use super::directory::{StoreError, TeamDirectory, UserDirectory};
use crate::error::AppError;
use crate::models::{Team, TeamMember};

#[derive(Clone)]
pub struct TeamService {
    users: Arc<dyn UserDirectory>,
    teams: Arc<dyn TeamDirectory>,
}

impl TeamService {
    pub fn new(users: Arc<dyn UserDirectory>, teams: Arc<dyn TeamDirectory>) -> Self {
        Self { users, teams }
    }

    /// Create a team and upsert every member as a user of that team.
    ///
    /// The team directory decides uniqueness; an existing name yields
    /// `TeamExists` and no users are touched.
    pub async fn add(&self, team_name: &str, members: Vec<TeamMember>) -> Result<Team, AppError> {
        if team_name.is_empty() {
            return Err(AppError::required_field("team_name"));
        }
        if members.iter().any(|m| m.user_id.is_empty()) {
            return Err(AppError::required_field("members.user_id"));
        }

        let team = Team {
            team_name: team_name.to_string(),
            members,
        };

        self.teams.create(&team).await.map_err(|e| match e {
            StoreError::AlreadyExists => AppError::TeamExists {
                team_name: team_name.to_string(),
            },
            other => AppError::storage(other, "teams.create"),
        })?;

        self.users
            .bulk_upsert(&team.member_users())
            .await
            .map_err(|e| AppError::storage(e, "users.bulk_upsert"))?;

        log::info!(
            "[team] Created {} with {} members",
            team.team_name,
            team.members.len()
        );
        Ok(team)
    }

    /// Fetch a team with its current members.
    ///
    /// Membership and activity come from the user directory, so users moved
    /// to another team or deactivated since creation are reflected.
    pub async fn get(&self, team_name: &str) -> Result<Team, AppError> {
        let mut team = self
            .teams
            .get_by_name(team_name)
            .await
            .map_err(|e| not_found_or_storage(e, "team", team_name, "teams.get_by_name"))?;

        team.members = self
            .users
            .list_by_team(team_name, false)
            .await
            .map_err(|e| AppError::storage(e, "users.list_by_team"))?
            .iter()
            .map(TeamMember::from)
            .collect();
        Ok(team)
    }

    /// Set every member of the team inactive.
    ///
    /// The member list is read first, so a user removed by another writer
    /// before its turn comes back `NotFound` and is skipped. Returns the ids
    /// that were deactivated, in member order.
    pub async fn deactivate_members(&self, team_name: &str) -> Result<Vec<String>, AppError> {
        let team = self.get(team_name).await?;

        let mut deactivated = Vec::with_capacity(team.members.len());
        for member in &team.members {
            match self.users.set_active(&member.user_id, false).await {
                Ok(user) => deactivated.push(user.user_id),
                Err(StoreError::NotFound) => {
                    log::debug!("[team] Skipping missing member {}", member.user_id);
                }
                Err(e) => return Err(AppError::storage(e, "users.set_active")),
            }
        }

        log::info!(
            "[team] Deactivated {} members of {}",
            deactivated.len(),
            team_name
        );
        Ok(deactivated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::services::memory::{InMemoryTeamDirectory, InMemoryUserDirectory};

    fn member(id: &str, active: bool) -> TeamMember {
        TeamMember {
            user_id: id.to_string(),
            username: format!("user {}", id),
            is_active: active,
        }
    }

    fn service() -> (Arc<InMemoryUserDirectory>, TeamService) {
        let users = Arc::new(InMemoryUserDirectory::new());
        let teams = Arc::new(InMemoryTeamDirectory::new());
        (users.clone(), TeamService::new(users, teams))
    }

    #[tokio::test]
    async fn test_add_upserts_members() {
        let (users, service) = service();

        let team = service
            .add("backend", vec![member("u1", true), member("u2", false)])
            .await
            .unwrap();
        assert_eq!(team.members.len(), 2);

        let u2 = users.get_by_id("u2").await.unwrap();
        assert_eq!(u2.team_name, "backend");
        assert!(!u2.is_active);
    }

    #[tokio::test]
    async fn test_add_moves_existing_user_to_new_team() {
        let (users, service) = service();
        service.add("backend", vec![member("u1", true)]).await.unwrap();

        service.add("payments", vec![member("u1", false)]).await.unwrap();

        let u1 = users.get_by_id("u1").await.unwrap();
        assert_eq!(u1.team_name, "payments");
        assert!(!u1.is_active);
    }

    #[tokio::test]
    async fn test_add_existing_team() {
        let (users, service) = service();
        service.add("backend", vec![member("u1", true)]).await.unwrap();

        let err = service
            .add("backend", vec![member("u9", true)])
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("TEAM_EXISTS"));
        // The rejected request must not create users.
        assert!(users.get_by_id("u9").await.is_err());
    }

    #[tokio::test]
    async fn test_add_rejects_empty_names() {
        let (_, service) = service();

        let err = service.add("", vec![]).await.unwrap_err();
        assert_eq!(err.code(), Some("INVALID_INPUT"));

        let err = service
            .add("backend", vec![member("", true)])
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("INVALID_INPUT"));
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let (_, service) = service();
        let err = service.get("nope").await.unwrap_err();
        assert_eq!(err.code(), Some("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_get_reflects_current_users() {
        let (users, service) = service();
        service
            .add("backend", vec![member("u2", true), member("u1", true)])
            .await
            .unwrap();
        service.add("payments", vec![member("u2", true)]).await.unwrap();
        users.set_active("u1", false).await.unwrap();

        let team = service.get("backend").await.unwrap();
        assert_eq!(team.members, vec![member("u1", false)]);
    }

    #[tokio::test]
    async fn test_deactivate_members_only_touches_current_members() {
        let users = Arc::new(InMemoryUserDirectory::new());
        let teams = Arc::new(InMemoryTeamDirectory::new());
        let service = TeamService::new(users.clone(), teams);
        service
            .add("backend", vec![member("u1", true), member("u2", true), member("u3", true)])
            .await
            .unwrap();
        users
            .bulk_upsert(&[User::new("u3", "C", "payments", true)])
            .await
            .unwrap();

        let deactivated = service.deactivate_members("backend").await.unwrap();

        assert_eq!(deactivated, vec!["u1", "u2"]);
        assert!(users.list_by_team("backend", true).await.unwrap().is_empty());
        assert!(users.get_by_id("u3").await.unwrap().is_active);
    }

    /// User directory whose `set_active` reports `NotFound` for one user, as
    /// if it was removed after the member list was read.
    struct VanishingUsers {
        inner: InMemoryUserDirectory,
        gone: &'static str,
    }

    #[async_trait::async_trait]
    impl UserDirectory for VanishingUsers {
        async fn get_by_id(&self, user_id: &str) -> Result<User, StoreError> {
            self.inner.get_by_id(user_id).await
        }

        async fn list_by_team(
            &self,
            team_name: &str,
            only_active: bool,
        ) -> Result<Vec<User>, StoreError> {
            self.inner.list_by_team(team_name, only_active).await
        }

        async fn set_active(&self, user_id: &str, is_active: bool) -> Result<User, StoreError> {
            if user_id == self.gone {
                return Err(StoreError::NotFound);
            }
            self.inner.set_active(user_id, is_active).await
        }

        async fn bulk_upsert(&self, users: &[User]) -> Result<(), StoreError> {
            self.inner.bulk_upsert(users).await
        }
    }

    #[tokio::test]
    async fn test_deactivate_members_skips_user_removed_mid_walk() {
        let users = Arc::new(VanishingUsers {
            inner: InMemoryUserDirectory::new(),
            gone: "u2",
        });
        let service = TeamService::new(users.clone(), Arc::new(InMemoryTeamDirectory::new()));
        service
            .add("backend", vec![member("u1", true), member("u2", true), member("u3", true)])
            .await
            .unwrap();

        let deactivated = service.deactivate_members("backend").await.unwrap();

        assert_eq!(deactivated, vec!["u1", "u3"]);
        assert!(users.inner.get_by_id("u2").await.unwrap().is_active);
    }
}
