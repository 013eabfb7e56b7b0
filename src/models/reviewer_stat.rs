//! Derived reviewer workload aggregate.

use serde::Serialize;
use sqlx::FromRow;

/// Number of pull requests (open or merged) a user is assigned to review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct ReviewerStat {
    pub user_id: String,
    pub review_count: i64,
}
