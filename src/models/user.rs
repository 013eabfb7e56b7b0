//! User model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A team member that may be assigned as a reviewer.
///
/// Team membership is authoritative through `team_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl User {
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        team_name: impl Into<String>,
        is_active: bool,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            team_name: team_name.into(),
            is_active,
        }
    }
}
