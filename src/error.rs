use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::{grading::GradingError, questions::QuestionError};

/// Errors returned by API handlers. Rendered as `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error("Session {0} does not exist")]
    SessionNotFound(Uuid),

    #[error(transparent)]
    Grading(#[from] GradingError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::InvalidBody(_) | ApiError::Question(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Grading(GradingError::MissingApiKey) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Grading(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
