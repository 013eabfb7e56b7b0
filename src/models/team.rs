//! Team model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::User;

/// A member entry inside a team, as supplied when the team is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

/// A named team and its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

impl Team {
    /// Users to upsert so the user directory agrees with this team's member list.
    pub fn member_users(&self) -> Vec<User> {
        self.members
            .iter()
            .map(|m| User {
                user_id: m.user_id.clone(),
                username: m.username.clone(),
                team_name: self.team_name.clone(),
                is_active: m.is_active,
            })
            .collect()
    }
}

impl From<&User> for TeamMember {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.clone(),
            username: user.username.clone(),
            is_active: user.is_active,
        }
    }
}
