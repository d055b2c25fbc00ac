use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::database::entities::bags;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::services::{Actor, BagInput};

#[derive(Deserialize)]
pub struct BagListParams {
    pub batch: Option<i32>,
}

pub async fn list_bags(
    State(state): State<AppState>,
    Query(params): Query<BagListParams>,
) -> Result<Json<Vec<bags::Model>>, ApiError> {
    let bags = state.bags.list_bags(params.batch).await?;
    Ok(Json(bags))
}

pub async fn create_bag(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<BagInput>,
) -> Result<Json<bags::Model>, ApiError> {
    let bag = state.bags.create_bag(actor, payload).await?;
    Ok(Json(bag))
}

pub async fn get_bag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<bags::Model>, ApiError> {
    let bag = state.bags.get_bag(id).await?;
    Ok(Json(bag))
}

pub async fn update_bag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    actor: Actor,
    Json(payload): Json<BagInput>,
) -> Result<Json<bags::Model>, ApiError> {
    let bag = state.bags.update_bag(actor, id, payload).await?;
    Ok(Json(bag))
}

pub async fn delete_bag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    actor: Actor,
) -> Result<StatusCode, ApiError> {
    state.bags.delete_bag(actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
