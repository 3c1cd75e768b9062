use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::error::CreateError;
use crate::models::ValidationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Write failure; the underlying message is returned to the client.
    #[error("{0}")]
    Storage(String),

    /// Read failure. Logged in full, answered generically.
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<CreateError> for ApiError {
    fn from(err: CreateError) -> Self {
        match err {
            CreateError::Invalid(err) => ApiError::Validation(err),
            CreateError::Storage(message) => ApiError::Storage(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MalformedPayload | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(err) => {
                error!("request failed: {err:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
