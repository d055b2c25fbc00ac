use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::database::entities::{form_fields, forms};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::services::{FormInput, FormWithFields};

#[derive(Serialize)]
pub struct FormResponse {
    #[serde(flatten)]
    pub form: forms::Model,
    pub fields: Vec<form_fields::Model>,
}

impl From<FormWithFields> for FormResponse {
    fn from(value: FormWithFields) -> Self {
        Self {
            form: value.form,
            fields: value.fields,
        }
    }
}

#[derive(Deserialize)]
pub struct FormListParams {
    pub association_type: Option<String>,
}

pub async fn list_forms(
    State(state): State<AppState>,
    Query(params): Query<FormListParams>,
) -> Result<Json<Vec<FormResponse>>, ApiError> {
    let forms = state
        .forms
        .list_forms(params.association_type.as_deref())
        .await?;
    Ok(Json(forms.into_iter().map(Into::into).collect()))
}

pub async fn create_form(
    State(state): State<AppState>,
    Json(payload): Json<FormInput>,
) -> Result<Json<FormResponse>, ApiError> {
    let form = state.forms.create_form(payload).await?;
    Ok(Json(form.into()))
}

pub async fn get_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FormResponse>, ApiError> {
    let form = state.forms.get_form(id).await?;
    Ok(Json(form.into()))
}

pub async fn update_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<FormInput>,
) -> Result<Json<FormResponse>, ApiError> {
    let form = state.forms.update_form(id, payload).await?;
    Ok(Json(form.into()))
}

pub async fn delete_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.forms.delete_form(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
