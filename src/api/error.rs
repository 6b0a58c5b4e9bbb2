use crate::utils::error::ScrapeError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub const INTERNAL_ERROR_DETAIL: &str = "Error al procesar la solicitud";

/// Errors surfaced to HTTP clients as `{"detail": ...}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// Request body that is not valid JSON or does not match `ScrapeRequest`.
    Rejected { status: StatusCode, detail: String },
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            ApiError::BadRequest(message) => message,
            ApiError::Rejected { detail, .. } => detail,
            ApiError::Internal => INTERNAL_ERROR_DETAIL,
        }
    }
}

impl From<ScrapeError> for ApiError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::ValidationError { message } => ApiError::BadRequest(message),
            other => {
                tracing::error!("Internal scraper error: {}", other);
                tracing::error!("💡 Recovery suggestion: {}", other.recovery_suggestion());
                ApiError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        ApiError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.detail() }))).into_response()
    }
}
