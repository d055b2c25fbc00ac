use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::database::entities::submissions;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::services::{Actor, SubmissionInput};

#[derive(Deserialize)]
pub struct SubmissionListParams {
    pub form: Option<i32>,
    pub association_type: Option<String>,
}

pub async fn list_submissions(
    State(state): State<AppState>,
    Query(params): Query<SubmissionListParams>,
) -> Result<Json<Vec<submissions::Model>>, ApiError> {
    let submissions = state
        .submissions
        .list_submissions(params.form, params.association_type.as_deref())
        .await?;
    Ok(Json(submissions))
}

pub async fn create_submission(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<SubmissionInput>,
) -> Result<Json<submissions::Model>, ApiError> {
    let submission = state.submissions.create_submission(actor, payload).await?;
    Ok(Json(submission))
}

pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<submissions::Model>, ApiError> {
    let submission = state.submissions.get_submission(id).await?;
    Ok(Json(submission))
}

pub async fn update_submission(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<SubmissionInput>,
) -> Result<Json<submissions::Model>, ApiError> {
    let submission = state.submissions.update_submission(id, payload).await?;
    Ok(Json(submission))
}

pub async fn delete_submission(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.submissions.delete_submission(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
