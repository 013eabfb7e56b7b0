//! Application error types.
//!
//! Domain errors carry a stable machine-readable code; storage and
//! unexpected failures do not and are reported to callers as a generic
//! internal failure.

use serde::Serialize;
use thiserror::Error;

use crate::services::directory::StoreError;

/// Application-level errors returned by the service operations.
///
/// All variants serialize to a structured JSON object.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    /// Requested resource not found.
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// A team with this name already exists.
    #[error("team {team_name} already exists")]
    TeamExists { team_name: String },

    /// A pull request with this id already exists.
    #[error("pull request already exists: {pull_request_id}")]
    PrExists { pull_request_id: String },

    /// Reviewer changes were attempted on a merged pull request.
    #[error("cannot reassign reviewers on merged PR {pull_request_id}")]
    PrMerged { pull_request_id: String },

    /// The reviewer to replace is not assigned to the pull request.
    #[error("user {user_id} is not assigned as reviewer on {pull_request_id}")]
    NotAssigned {
        pull_request_id: String,
        user_id: String,
    },

    /// No active team member is eligible as a replacement reviewer.
    #[error("no active replacement candidate in team {team_name}")]
    NoCandidate { team_name: String },

    /// Invalid input provided.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        operation: Option<String>,
    },

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Broad response category for an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Absent,
    Conflict,
    BadInput,
    Failure,
}

impl AppError {
    /// Create a not found error for a resource with an id.
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error for a missing required field.
    pub fn required_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::InvalidInput {
            message: format!("{} is required", field),
            field: Some(field),
        }
    }

    /// Create a database error with operation context.
    pub fn database_with_op(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            operation: Some(operation.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Wrap a storage failure that has no domain meaning at this call site.
    pub fn storage(err: StoreError, operation: &str) -> Self {
        match err {
            StoreError::Database(e) => Self::database_with_op(e.to_string(), operation),
            StoreError::Corrupt(message) => Self::database_with_op(message, operation),
            other => Self::internal(format!("{}: {}", operation, other)),
        }
    }

    /// Stable machine-readable code, `None` for infrastructure failures.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("NOT_FOUND"),
            Self::TeamExists { .. } => Some("TEAM_EXISTS"),
            Self::PrExists { .. } => Some("PR_EXISTS"),
            Self::PrMerged { .. } => Some("PR_MERGED"),
            Self::NotAssigned { .. } => Some("NOT_ASSIGNED"),
            Self::NoCandidate { .. } => Some("NO_CANDIDATE"),
            Self::InvalidInput { .. } => Some("INVALID_INPUT"),
            Self::Database { .. } | Self::Internal { .. } => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::Absent,
            Self::TeamExists { .. }
            | Self::PrExists { .. }
            | Self::PrMerged { .. }
            | Self::NotAssigned { .. }
            | Self::NoCandidate { .. } => ErrorCategory::Conflict,
            Self::InvalidInput { .. } => ErrorCategory::BadInput,
            Self::Database { .. } | Self::Internal { .. } => ErrorCategory::Failure,
        }
    }
}

// Conversions from common error types

impl From<crate::db::DbError> for AppError {
    fn from(err: crate::db::DbError) -> Self {
        Self::Database {
            message: err.to_string(),
            operation: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = AppError::not_found("pull request", "pr-1");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"type\":\"NotFound\""));
        assert!(json.contains("\"id\":\"pr-1\""));
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(AppError::not_found("user", "u1").code(), Some("NOT_FOUND"));
        assert_eq!(
            AppError::PrExists {
                pull_request_id: "pr-1".into()
            }
            .code(),
            Some("PR_EXISTS")
        );
        assert_eq!(
            AppError::NoCandidate {
                team_name: "backend".into()
            }
            .code(),
            Some("NO_CANDIDATE")
        );
        assert_eq!(AppError::internal("boom").code(), None);
    }

    #[test]
    fn test_categories() {
        assert_eq!(AppError::not_found("team", "x").category(), ErrorCategory::Absent);
        assert_eq!(
            AppError::PrMerged {
                pull_request_id: "pr-9".into()
            }
            .category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            AppError::required_field("team_name").category(),
            ErrorCategory::BadInput
        );
        assert_eq!(
            AppError::database_with_op("disk I/O error", "pull_requests.update").category(),
            ErrorCategory::Failure
        );
    }

    #[test]
    fn test_optional_fields_not_serialized() {
        let err = AppError::invalid_input("bad");
        let json = serde_json::to_string(&err).unwrap();
        // field is None, so should not appear
        assert!(!json.contains("field"));
    }

    #[test]
    fn test_display_impl() {
        let err = AppError::required_field("old_user_id");
        assert_eq!(format!("{}", err), "Invalid input: old_user_id is required");
    }

    #[test]
    fn test_db_error_is_an_uncoded_failure() {
        let err = AppError::from(crate::db::DbError::Migration("bad statement".into()));
        assert_eq!(err.code(), None);
        assert_eq!(err.category(), ErrorCategory::Failure);
        assert!(err.to_string().contains("bad statement"));
    }
}
