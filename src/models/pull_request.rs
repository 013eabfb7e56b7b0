//! Pull request model and its merge state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on `assigned_reviewers`.
pub const MAX_REVIEWERS: usize = 2;

/// Lifecycle state of a pull request. `Merged` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestStatus {
    Open,
    Merged,
}

impl PullRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        }
    }
}

impl TryFrom<&str> for PullRequestStatus {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "OPEN" => Ok(Self::Open),
            "MERGED" => Ok(Self::Merged),
            other => Err(format!("unknown pull request status: {}", other)),
        }
    }
}

impl std::fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of applying a merge to a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeTransition {
    /// OPEN -> MERGED; needs to be persisted.
    Merged,
    /// Already MERGED but `merged_at` was missing and has been backfilled; needs to be persisted.
    Repaired,
    /// Already MERGED with a timestamp; nothing to write.
    Unchanged,
}

impl MergeTransition {
    pub fn needs_write(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// A pull request with its assigned reviewers.
///
/// `assigned_reviewers` holds at most [`MAX_REVIEWERS`] distinct user ids
/// and never contains `author_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
    pub assigned_reviewers: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "mergedAt", skip_serializing_if = "Option::is_none", default)]
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Build a freshly opened pull request.
    pub fn open(
        pull_request_id: impl Into<String>,
        pull_request_name: impl Into<String>,
        author_id: impl Into<String>,
        assigned_reviewers: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pull_request_id: pull_request_id.into(),
            pull_request_name: pull_request_name.into(),
            author_id: author_id.into(),
            status: PullRequestStatus::Open,
            assigned_reviewers,
            created_at,
            merged_at: None,
        }
    }

    pub fn is_merged(&self) -> bool {
        self.status == PullRequestStatus::Merged
    }

    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.assigned_reviewers.iter().any(|r| r == user_id)
    }

    /// Move the pull request into MERGED.
    ///
    /// An existing `merged_at` is never overwritten.
    pub fn apply_merge(&mut self, now: DateTime<Utc>) -> MergeTransition {
        match (self.status, self.merged_at) {
            (PullRequestStatus::Merged, Some(_)) => MergeTransition::Unchanged,
            (PullRequestStatus::Merged, None) => {
                self.merged_at = Some(now);
                MergeTransition::Repaired
            }
            (PullRequestStatus::Open, _) => {
                self.status = PullRequestStatus::Merged;
                self.merged_at = Some(now);
                MergeTransition::Merged
            }
        }
    }

    /// Swap `old` for `new` in place, keeping the position of every other reviewer.
    ///
    /// Returns `false` if `old` was not assigned.
    pub fn replace_reviewer(&mut self, old: &str, new: &str) -> bool {
        match self.assigned_reviewers.iter_mut().find(|r| *r == old) {
            Some(slot) => {
                *slot = new.to_string();
                true
            }
            None => false,
        }
    }

    pub fn to_short(&self) -> PullRequestShort {
        PullRequestShort {
            pull_request_id: self.pull_request_id.clone(),
            pull_request_name: self.pull_request_name.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
        }
    }
}

/// Summary view used when listing a reviewer's pull requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShort {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
}
