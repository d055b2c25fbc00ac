use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use anyhow::{Context, Result};

use crate::services::{BagService, BatchService, FormService, SubmissionService};

use super::handlers::{bags, batches, form_fields, forms, health, submissions};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub forms: FormService,
    pub batches: BatchService,
    pub bags: BagService,
    pub submissions: SubmissionService,
}

pub async fn create_app(db: DatabaseConnection, cors_origin: Option<&str>) -> Result<Router> {
    let state = AppState {
        forms: FormService::new(db.clone()),
        batches: BatchService::new(db.clone()),
        bags: BagService::new(db.clone()),
        submissions: SubmissionService::new(db.clone()),
        db,
    };

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<axum::http::HeaderValue>()
                    .context("invalid CORS origin")?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_v1_routes())
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    Ok(app)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Batch routes
        .route("/batches", get(batches::list_batches))
        .route("/batches", post(batches::create_batch))
        .route("/batches/:id", get(batches::get_batch))
        .route("/batches/:id", put(batches::update_batch))
        .route("/batches/:id", delete(batches::delete_batch))
        // Bag routes
        .route("/bags", get(bags::list_bags))
        .route("/bags", post(bags::create_bag))
        .route("/bags/:id", get(bags::get_bag))
        .route("/bags/:id", put(bags::update_bag))
        .route("/bags/:id", delete(bags::delete_bag))
        // Form definition routes
        .route("/forms", get(forms::list_forms))
        .route("/forms", post(forms::create_form))
        .route("/forms/:id", get(forms::get_form))
        .route("/forms/:id", put(forms::update_form))
        .route("/forms/:id", delete(forms::delete_form))
        // Field definition routes
        .route("/formfields", get(form_fields::list_fields))
        .route("/formfields", post(form_fields::create_field))
        .route("/formfields/:id", get(form_fields::get_field))
        .route("/formfields/:id", put(form_fields::update_field))
        .route("/formfields/:id", delete(form_fields::delete_field))
        // Submission routes
        .route("/submissions", get(submissions::list_submissions))
        .route("/submissions", post(submissions::create_submission))
        .route("/submissions/:id", get(submissions::get_submission))
        .route("/submissions/:id", put(submissions::update_submission))
        .route("/submissions/:id", delete(submissions::delete_submission))
}
