//! Data models for the application.
//!
//! These models represent the core entities stored by the directories
//! and returned to HTTP callers.
//!
//! Row-shaped models derive `FromRow` for SQLx queries; the pull request
//! keeps its reviewer list as a JSON column and goes through a row type.

pub mod pull_request;
pub mod reviewer_stat;
pub mod team;
pub mod user;

// Re-exports for convenient access
pub use pull_request::{
    MergeTransition, PullRequest, PullRequestShort, PullRequestStatus, MAX_REVIEWERS,
};
pub use reviewer_stat::ReviewerStat;
pub use team::{Team, TeamMember};
pub use user::User;
