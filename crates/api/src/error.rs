use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use thiserror::Error;

use atlas_domain::error::DomainError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal error")]
    Internal,
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::EmptyRequest
            | DomainError::EmptyCoordinates
            | DomainError::EmptyZoom
            | DomainError::EmptyActor
            | DomainError::IncorrectCoordinates
            | DomainError::IncorrectZoom => ApiError::Validation(err.to_string()),
            DomainError::NotFoundCountry
            | DomainError::NotFoundBoundary
            | DomainError::NotFoundBoundaryKind
            | DomainError::NotFoundCountryBoundary => ApiError::NotFound(err.to_string()),
            DomainError::DeletedCountry
            | DomainError::DeletedBoundary
            | DomainError::DeletedBoundaryKind
            | DomainError::DeletedCountryBoundary
            | DomainError::NotDeletedBoundary
            | DomainError::NotDeletedCountryBoundary
            | DomainError::ExistsCountryBoundary
            | DomainError::NotChangesCoordinates => ApiError::Conflict(err.to_string()),
            DomainError::CacheTimeout | DomainError::Storage(_) => {
                tracing::error!(error = %err, "backend failure");
                ApiError::Internal
            }
        }
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal => "internal_error",
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let message = self.to_string();
        let body = ErrorEnvelope {
            error: ErrorBody {
                code: self.error_code(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}
