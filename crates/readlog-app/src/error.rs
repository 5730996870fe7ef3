use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use readlog_types::ValidationError;
use serde_json::json;
use tracing::error;

use crate::reading::error::{ErrorKind, ReadingError};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Reading(#[from] ReadingError),
    #[error("Invalid request body: {1}")]
    InvalidBody(StatusCode, String),
    #[error("Unauthorized")]
    Unauthorized,
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        ApiError::Reading(ReadingError::Validation(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::InvalidBody(value.status(), value.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Reading(e) => match e.kind() {
                ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::InvalidDate => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::InvalidState => StatusCode::CONFLICT,
                ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::InvalidBody(status, _) => *status,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error.message = %self, "Unexpected error while handling request");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
