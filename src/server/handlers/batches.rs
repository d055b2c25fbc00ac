use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;

use crate::database::entities::batches;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::services::{Actor, BatchInput};

#[derive(Serialize)]
pub struct BatchResponse {
    #[serde(flatten)]
    pub batch: batches::Model,
    pub bag_count: u64,
}

impl From<(batches::Model, u64)> for BatchResponse {
    fn from((batch, bag_count): (batches::Model, u64)) -> Self {
        Self { batch, bag_count }
    }
}

pub async fn list_batches(
    State(state): State<AppState>,
) -> Result<Json<Vec<BatchResponse>>, ApiError> {
    let batches = state.batches.list_batches().await?;
    Ok(Json(batches.into_iter().map(Into::into).collect()))
}

pub async fn create_batch(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<BatchInput>,
) -> Result<Json<BatchResponse>, ApiError> {
    let batch = state.batches.create_batch(actor, payload).await?;
    Ok(Json(batch.into()))
}

pub async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<BatchResponse>, ApiError> {
    let batch = state.batches.get_batch(id).await?;
    Ok(Json(batch.into()))
}

pub async fn update_batch(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    actor: Actor,
    Json(payload): Json<BatchInput>,
) -> Result<Json<BatchResponse>, ApiError> {
    let batch = state.batches.update_batch(actor, id, payload).await?;
    Ok(Json(batch.into()))
}

pub async fn delete_batch(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    actor: Actor,
) -> Result<StatusCode, ApiError> {
    state.batches.delete_batch(actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
