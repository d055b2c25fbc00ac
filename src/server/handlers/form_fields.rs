use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::database::entities::form_fields;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::services::FieldInput;

#[derive(Deserialize)]
pub struct CreateFieldRequest {
    pub form_id: i32,
    #[serde(flatten)]
    pub field: FieldInput,
}

#[derive(Deserialize)]
pub struct FieldListParams {
    pub form: Option<i32>,
}

pub async fn list_fields(
    State(state): State<AppState>,
    Query(params): Query<FieldListParams>,
) -> Result<Json<Vec<form_fields::Model>>, ApiError> {
    let fields = state.forms.list_fields(params.form).await?;
    Ok(Json(fields))
}

pub async fn create_field(
    State(state): State<AppState>,
    Json(payload): Json<CreateFieldRequest>,
) -> Result<Json<form_fields::Model>, ApiError> {
    let field = state.forms.create_field(payload.form_id, payload.field).await?;
    Ok(Json(field))
}

pub async fn get_field(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<form_fields::Model>, ApiError> {
    let field = state.forms.get_field(id).await?;
    Ok(Json(field))
}

pub async fn update_field(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<FieldInput>,
) -> Result<Json<form_fields::Model>, ApiError> {
    let field = state.forms.update_field(id, payload).await?;
    Ok(Json(field))
}

pub async fn delete_field(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.forms.delete_field(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
