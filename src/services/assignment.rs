//! Reviewer assignment engine.
//!
//! Decides who reviews a new pull request, swaps reviewers on request and
//! merges pull requests idempotently. Holds no state of its own; every read
//! and write goes through the injected directories.
//!
//! Candidate selection is first-fit over the order returned by
//! [`UserDirectory::list_by_team`] (user id order). There is no randomization
//! and no load balancing.

use std::sync::Arc;

use chrono::Utc;

use super::directory::{PullRequestStore, StoreError, TeamDirectory, UserDirectory};
use crate::error::AppError;
use crate::models::{MergeTransition, PullRequest, User, MAX_REVIEWERS};

/// Map a directory `NotFound` onto the domain error for `resource`/`id`;
/// anything else is wrapped as a storage failure.
pub(crate) fn not_found_or_storage(
    err: StoreError,
    resource: &str,
    id: &str,
    operation: &str,
) -> AppError {
    match err {
        StoreError::NotFound => AppError::not_found(resource, id),
        other => AppError::storage(other, operation),
    }
}

/// Pick up to [`MAX_REVIEWERS`] reviewers from `members`, skipping the author.
pub fn select_reviewers(members: &[User], author_id: &str) -> Vec<String> {
    members
        .iter()
        .filter(|u| u.user_id != author_id)
        .take(MAX_REVIEWERS)
        .map(|u| u.user_id.clone())
        .collect()
}

/// First member eligible to replace `old_user_id` on `pr`.
///
/// Excludes the old reviewer, the author and anyone already assigned.
pub fn select_replacement<'a>(
    members: &'a [User],
    pr: &PullRequest,
    old_user_id: &str,
) -> Option<&'a User> {
    members.iter().find(|u| {
        u.user_id != old_user_id && u.user_id != pr.author_id && !pr.has_reviewer(&u.user_id)
    })
}

/// Pull request operations: create, merge, reassign.
#[derive(Clone)]
pub struct AssignmentEngine {
    users: Arc<dyn UserDirectory>,
    teams: Arc<dyn TeamDirectory>,
    prs: Arc<dyn PullRequestStore>,
}

impl AssignmentEngine {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        teams: Arc<dyn TeamDirectory>,
        prs: Arc<dyn PullRequestStore>,
    ) -> Self {
        Self { users, teams, prs }
    }

    /// Create an OPEN pull request and assign up to two reviewers from the
    /// author's team.
    ///
    /// Zero or one reviewer is not an error when the team is small.
    pub async fn create(
        &self,
        pull_request_id: &str,
        pull_request_name: &str,
        author_id: &str,
    ) -> Result<PullRequest, AppError> {
        let author = self
            .users
            .get_by_id(author_id)
            .await
            .map_err(|e| not_found_or_storage(e, "author", author_id, "users.get_by_id"))?;

        // Only the team's existence matters here.
        self.teams
            .get_by_name(&author.team_name)
            .await
            .map_err(|e| {
                not_found_or_storage(e, "team", &author.team_name, "teams.get_by_name")
            })?;

        let members = self
            .users
            .list_by_team(&author.team_name, true)
            .await
            .map_err(|e| AppError::storage(e, "users.list_by_team"))?;

        let reviewers = select_reviewers(&members, author_id);
        let pr = PullRequest::open(
            pull_request_id,
            pull_request_name,
            author_id,
            reviewers,
            Utc::now(),
        );

        self.prs.create(&pr).await.map_err(|e| match e {
            StoreError::AlreadyExists => AppError::PrExists {
                pull_request_id: pull_request_id.to_string(),
            },
            other => AppError::storage(other, "pull_requests.create"),
        })?;

        log::info!(
            "[assign] Created {} by {} with reviewers {:?}",
            pr.pull_request_id,
            pr.author_id,
            pr.assigned_reviewers
        );
        Ok(pr)
    }

    /// Mark a pull request MERGED.
    ///
    /// Repeating the call returns the stored pull request without writing.
    /// After a write the stored row is returned, so racing merges all report
    /// the `merged_at` that won.
    pub async fn merge(&self, pull_request_id: &str) -> Result<PullRequest, AppError> {
        let mut pr = self.get_pull_request(pull_request_id).await?;

        let transition = pr.apply_merge(Utc::now());
        if !transition.needs_write() {
            log::debug!("[assign] {} already merged", pull_request_id);
            return Ok(pr);
        }

        if transition == MergeTransition::Repaired {
            log::warn!(
                "[assign] {} was MERGED without merged_at; backfilling",
                pull_request_id
            );
        }

        self.prs.update(&pr).await.map_err(|e| {
            not_found_or_storage(e, "pull request", pull_request_id, "pull_requests.update")
        })?;
        let pr = self.get_pull_request(pull_request_id).await?;

        log::info!("[assign] Merged {}", pull_request_id);
        Ok(pr)
    }

    /// Replace `old_user_id` on an open pull request with the first eligible
    /// active member of the old reviewer's team.
    ///
    /// Returns the updated pull request and the id of the new reviewer.
    pub async fn reassign(
        &self,
        pull_request_id: &str,
        old_user_id: &str,
    ) -> Result<(PullRequest, String), AppError> {
        let mut pr = self.get_pull_request(pull_request_id).await?;

        if pr.is_merged() {
            return Err(AppError::PrMerged {
                pull_request_id: pull_request_id.to_string(),
            });
        }

        if !pr.has_reviewer(old_user_id) {
            return Err(AppError::NotAssigned {
                pull_request_id: pull_request_id.to_string(),
                user_id: old_user_id.to_string(),
            });
        }

        let old_reviewer = self
            .users
            .get_by_id(old_user_id)
            .await
            .map_err(|e| not_found_or_storage(e, "reviewer", old_user_id, "users.get_by_id"))?;

        let members = self
            .users
            .list_by_team(&old_reviewer.team_name, true)
            .await
            .map_err(|e| AppError::storage(e, "users.list_by_team"))?;

        let new_reviewer = select_replacement(&members, &pr, old_user_id)
            .map(|u| u.user_id.clone())
            .ok_or_else(|| AppError::NoCandidate {
                team_name: old_reviewer.team_name.clone(),
            })?;

        pr.replace_reviewer(old_user_id, &new_reviewer);

        self.prs.update(&pr).await.map_err(|e| {
            not_found_or_storage(e, "pull request", pull_request_id, "pull_requests.update")
        })?;

        log::info!(
            "[assign] Reassigned reviewer on {}: {} -> {}",
            pull_request_id,
            old_user_id,
            new_reviewer
        );
        Ok((pr, new_reviewer))
    }

    async fn get_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, AppError> {
        self.prs.get_by_id(pull_request_id).await.map_err(|e| {
            not_found_or_storage(e, "pull request", pull_request_id, "pull_requests.get_by_id")
        })
    }
}
