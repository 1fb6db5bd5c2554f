//! # API REST
//!
//! REST API implementation for PMS.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - The OpenAPI document, served at `/api-docs/openapi.json`
//! - REST-specific concerns (JSON bodies, status codes, CORS)
//!
//! All patient logic lives in `pms-core`; this crate only adapts it to HTTP.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;

use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use pms_core::PatientService;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

pub use error::{ApiError, ErrorBody};

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    pub patient_service: PatientService,
}

impl AppState {
    pub fn new(patient_service: PatientService) -> Self {
        Self { patient_service }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::root,
        handlers::about,
        handlers::view,
        handlers::view_patient,
        handlers::sort_patients,
        handlers::create_patient,
    ),
    components(schemas(
        handlers::MessageRes,
        ErrorBody,
        pms_core::PatientFields,
        pms_core::PatientView,
        pms_core::PatientEntry,
        pms_core::StoredPatient,
        pms_core::Gender,
        pms_core::Verdict,
        pms_core::Violation,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/about", get(handlers::about))
        .route("/view", get(handlers::view))
        .route("/patient/:id", get(handlers::view_patient))
        .route("/sort", get(handlers::sort_patients))
        .route("/create", post(handlers::create_patient))
        .route("/api-docs/openapi.json", get(openapi))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
