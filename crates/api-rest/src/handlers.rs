//! HTTP request handlers.
//!
//! Handlers stay thin: they extract request data, call [`PatientService`], and let [`ApiError`]
//! turn failures into status codes.
//!
//! [`PatientService`]: pms_core::PatientService

use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use pms_core::query::{parse_sort_params, PatientViews};
use pms_core::{PatientEntry, PatientFields, PatientView};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// A plain informational message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    fn json(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// Query parameters accepted by `/sort`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SortQuery {
    /// One of `height`, `weight` or `bmi`.
    pub sort_by: Option<String>,
    /// `asc` (default) or `desc`.
    pub order: Option<String>,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is alive", body = MessageRes)
    )
)]
#[axum::debug_handler]
pub async fn root() -> Json<MessageRes> {
    MessageRes::json("Patient Management System API")
}

#[utoipa::path(
    get,
    path = "/about",
    responses(
        (status = 200, description = "Service description", body = MessageRes)
    )
)]
#[axum::debug_handler]
pub async fn about() -> Json<MessageRes> {
    MessageRes::json("A fully functional API to manage your patient records")
}

#[utoipa::path(
    get,
    path = "/view",
    responses(
        (status = 200, description = "Every patient keyed by id, with BMI and verdict"),
        (status = 500, description = "Internal server error", body = crate::error::ErrorBody)
    )
)]
/// Dump the whole patient store.
///
/// # Errors
/// Returns `500 Internal Server Error` if the store cannot be loaded.
#[axum::debug_handler]
pub async fn view(State(state): State<AppState>) -> Result<Json<PatientViews>, ApiError> {
    Ok(Json(state.patient_service.view_all()?))
}

#[utoipa::path(
    get,
    path = "/patient/{id}",
    params(
        ("id" = String, Path, description = "ID of the patient in the store", example = "P001")
    ),
    responses(
        (status = 200, description = "Patient found", body = PatientView),
        (status = 404, description = "Patient id not found", body = crate::error::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::error::ErrorBody)
    )
)]
/// Fetch one patient by id.
///
/// # Errors
/// Returns `404 Not Found` for an unknown id, `500` if the store cannot be loaded.
#[axum::debug_handler]
pub async fn view_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PatientView>, ApiError> {
    Ok(Json(state.patient_service.get(&id)?))
}

#[utoipa::path(
    get,
    path = "/sort",
    params(SortQuery),
    responses(
        (status = 200, description = "Patients in the requested order", body = [PatientEntry]),
        (status = 400, description = "Invalid sort field or order", body = crate::error::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::error::ErrorBody)
    )
)]
/// List patients ordered by height, weight or BMI.
///
/// Parameters are checked before the store is read.
///
/// # Errors
/// Returns `400 Bad Request` for a missing or unknown `sort_by`, or an unknown `order`.
#[axum::debug_handler]
pub async fn sort_patients(
    State(state): State<AppState>,
    Query(query): Query<SortQuery>,
) -> Result<Json<Vec<PatientEntry>>, ApiError> {
    let (field, order) = parse_sort_params(query.sort_by.as_deref(), query.order.as_deref())?;
    Ok(Json(state.patient_service.sorted(field, order)?))
}

#[utoipa::path(
    post,
    path = "/create",
    request_body = PatientFields,
    responses(
        (status = 201, description = "Patient created", body = MessageRes),
        (status = 400, description = "Patient already exists", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid patient fields", body = crate::error::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::error::ErrorBody)
    )
)]
/// Create a new patient record.
///
/// # Errors
/// - `400 Bad Request` if the id already exists.
/// - `422 Unprocessable Entity` if the body is not JSON or any field is invalid; every
///   violated constraint is listed.
/// - `500 Internal Server Error` if the store cannot be loaded or saved.
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    payload: Result<Json<PatientFields>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageRes>), ApiError> {
    let Json(fields) = payload?;
    state.patient_service.create(fields)?;
    Ok((
        StatusCode::CREATED,
        MessageRes::json("Patient created successfully"),
    ))
}
