//! Mapping of core errors onto HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use pms_core::{PatientError, Violation};
use serde::Serialize;
use utoipa::ToSchema;

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    /// Every violated field constraint, present only for validation failures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

/// An error ready to be sent to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    violations: Vec<Violation>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            violations: Vec::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<PatientError> for ApiError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::Validation(violations) => {
                tracing::warn!("rejected patient: {}", violations);
                Self {
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    message: "invalid patient".into(),
                    violations: violations.iter().cloned().collect(),
                }
            }
            PatientError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "patient id not found"),
            PatientError::AlreadyExists(_) => {
                Self::new(StatusCode::BAD_REQUEST, "patient already exists")
            }
            PatientError::InvalidArgument(message) | PatientError::InvalidInput(message) => {
                Self::new(StatusCode::BAD_REQUEST, message)
            }
            e @ (PatientError::StorageUnavailable(_)
            | PatientError::MalformedData(_)
            | PatientError::Serialization(_)) => {
                tracing::error!("patient store error: {:?}", e);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match &rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            other => other.status(),
        };
        tracing::warn!("rejected request body: {}", rejection.body_text());
        Self::new(status, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            violations: self.violations,
        });
        (self.status, body).into_response()
    }
}
