//! REST API routes.
//!
//! Thin HTTP adapter over the services: validates required fields, calls
//! one service operation and shapes the JSON response.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCategory};
use crate::models::{PullRequest, PullRequestShort, ReviewerStat, Team, TeamMember, User};
use crate::services::server::AppState;

// ── Error handling ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// JSON error envelope: `{"error": {"code", "message"}}`.
#[derive(Serialize)]
struct ApiError {
    error: ErrorBody,
}

/// Wrapper to make AppError usable as an axum error response.
pub struct ApiErr(AppError);

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let status = match self.0.category() {
            ErrorCategory::Absent => StatusCode::NOT_FOUND,
            ErrorCategory::Conflict => StatusCode::CONFLICT,
            ErrorCategory::BadInput => StatusCode::BAD_REQUEST,
            ErrorCategory::Failure => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match self.0.code() {
            Some(code) => ErrorBody {
                code: code.to_string(),
                message: self.0.to_string(),
            },
            None => {
                log::error!("[api] {}", self.0);
                ErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "internal server error".to_string(),
                }
            }
        };

        (status, Json(ApiError { error: body })).into_response()
    }
}

impl From<AppError> for ApiErr {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::invalid_input(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiErr {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::invalid_input(rejection.body_text()))
    }
}

type ApiResult<T> = Result<T, ApiErr>;

fn require(value: &str, field: &str) -> Result<(), ApiErr> {
    if value.is_empty() {
        return Err(AppError::required_field(field).into());
    }
    Ok(())
}

// ── Request and response types ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TeamAddRequest {
    #[serde(default)]
    team_name: String,
    #[serde(default)]
    members: Vec<TeamMember>,
}

#[derive(Serialize)]
struct TeamResponse {
    team: Team,
}

#[derive(Deserialize)]
pub struct TeamNameQuery {
    #[serde(default)]
    team_name: String,
}

#[derive(Deserialize)]
pub struct TeamNameRequest {
    #[serde(default)]
    team_name: String,
}

#[derive(Serialize)]
struct DeactivateMembersResponse {
    team_name: String,
    deactivated: Vec<String>,
}

#[derive(Deserialize)]
pub struct SetIsActiveRequest {
    #[serde(default)]
    user_id: String,
    is_active: bool,
}

#[derive(Serialize)]
struct UserResponse {
    user: User,
}

#[derive(Deserialize)]
pub struct UserIdQuery {
    #[serde(default)]
    user_id: String,
}

#[derive(Serialize)]
struct UserReviewResponse {
    user_id: String,
    pull_requests: Vec<PullRequestShort>,
}

#[derive(Deserialize)]
pub struct CreatePullRequestRequest {
    #[serde(default)]
    pull_request_id: String,
    #[serde(default)]
    pull_request_name: String,
    #[serde(default)]
    author_id: String,
}

#[derive(Deserialize)]
pub struct MergePullRequestRequest {
    #[serde(default)]
    pull_request_id: String,
}

#[derive(Deserialize)]
pub struct ReassignRequest {
    #[serde(default)]
    pull_request_id: String,
    #[serde(default)]
    old_user_id: String,
}

#[derive(Serialize)]
struct PullRequestResponse {
    pr: PullRequest,
}

#[derive(Serialize)]
struct ReassignResponse {
    pr: PullRequest,
    replaced_by: String,
}

#[derive(Serialize)]
struct ReviewerStatsResponse {
    items: Vec<ReviewerStat>,
}

// ── Route builder ────────────────────────────────────────────────────────────

/// Build all API routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/team/add", post(add_team))
        .route("/team/get", get(get_team))
        .route("/team/deactivateMembers", post(deactivate_members))
        .route("/users/setIsActive", post(set_is_active))
        .route("/users/getReview", get(get_review))
        .route("/pullRequest/create", post(create_pull_request))
        .route("/pullRequest/merge", post(merge_pull_request))
        .route("/pullRequest/reassign", post(reassign_reviewer))
        .route("/stats/reviewers", get(reviewer_stats))
        .route("/health", get(health))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /team/add — create a team and upsert its members.
async fn add_team(
    State(state): State<AppState>,
    payload: Result<Json<TeamAddRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TeamResponse>)> {
    let Json(req) = payload?;
    require(&req.team_name, "team_name")?;

    let team = state.teams.add(&req.team_name, req.members).await?;
    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

/// GET /team/get?team_name=X — a team with its members.
async fn get_team(
    State(state): State<AppState>,
    query: Result<Query<TeamNameQuery>, QueryRejection>,
) -> ApiResult<Json<Team>> {
    let Query(params) = query?;
    require(&params.team_name, "team_name")?;

    Ok(Json(state.teams.get(&params.team_name).await?))
}

/// POST /team/deactivateMembers — set every member of a team inactive.
async fn deactivate_members(
    State(state): State<AppState>,
    payload: Result<Json<TeamNameRequest>, JsonRejection>,
) -> ApiResult<Json<DeactivateMembersResponse>> {
    let Json(req) = payload?;
    require(&req.team_name, "team_name")?;

    let deactivated = state.teams.deactivate_members(&req.team_name).await?;
    Ok(Json(DeactivateMembersResponse {
        team_name: req.team_name,
        deactivated,
    }))
}

/// POST /users/setIsActive
async fn set_is_active(
    State(state): State<AppState>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    let Json(req) = payload?;
    require(&req.user_id, "user_id")?;

    let user = state.users.set_is_active(&req.user_id, req.is_active).await?;
    Ok(Json(UserResponse { user }))
}

/// GET /users/getReview?user_id=X — pull requests the user reviews.
async fn get_review(
    State(state): State<AppState>,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> ApiResult<Json<UserReviewResponse>> {
    let Query(params) = query?;
    require(&params.user_id, "user_id")?;

    let pull_requests = state.users.get_review(&params.user_id).await?;
    Ok(Json(UserReviewResponse {
        user_id: params.user_id,
        pull_requests,
    }))
}

/// POST /pullRequest/create
async fn create_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<CreatePullRequestRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PullRequestResponse>)> {
    let Json(req) = payload?;
    require(&req.pull_request_id, "pull_request_id")?;
    require(&req.pull_request_name, "pull_request_name")?;
    require(&req.author_id, "author_id")?;

    let pr = state
        .engine
        .create(&req.pull_request_id, &req.pull_request_name, &req.author_id)
        .await?;
    Ok((StatusCode::CREATED, Json(PullRequestResponse { pr })))
}

/// POST /pullRequest/merge — idempotent.
async fn merge_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<MergePullRequestRequest>, JsonRejection>,
) -> ApiResult<Json<PullRequestResponse>> {
    let Json(req) = payload?;
    require(&req.pull_request_id, "pull_request_id")?;

    let pr = state.engine.merge(&req.pull_request_id).await?;
    Ok(Json(PullRequestResponse { pr }))
}

/// POST /pullRequest/reassign
async fn reassign_reviewer(
    State(state): State<AppState>,
    payload: Result<Json<ReassignRequest>, JsonRejection>,
) -> ApiResult<Json<ReassignResponse>> {
    let Json(req) = payload?;
    require(&req.pull_request_id, "pull_request_id")?;
    require(&req.old_user_id, "old_user_id")?;

    let (pr, replaced_by) = state
        .engine
        .reassign(&req.pull_request_id, &req.old_user_id)
        .await?;
    Ok(Json(ReassignResponse { pr, replaced_by }))
}

/// GET /stats/reviewers
async fn reviewer_stats(State(state): State<AppState>) -> ApiResult<Json<ReviewerStatsResponse>> {
    let items = state.stats.reviewer_stats().await?;
    Ok(Json(ReviewerStatsResponse { items }))
}

/// GET /health
async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_domain_error_response() {
        let response = ApiErr(AppError::NoCandidate {
            team_name: "backend".into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NO_CANDIDATE");
    }

    #[tokio::test]
    async fn test_internal_error_is_opaque() {
        let response =
            ApiErr(AppError::database_with_op("disk full", "pull_requests.update")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        assert!(!json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("disk full"));
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let response = require("", "author_id").unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_INPUT");
        assert_eq!(json["error"]["message"], "Invalid input: author_id is required");
    }
}
