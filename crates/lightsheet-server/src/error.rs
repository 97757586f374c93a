use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use lightsheet_shared::ChunkError;
use lightsheet_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    NotFound(String),

    #[error("invalid player index: {0}")]
    InvalidPlayer(usize),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Login failure. Distinct from [`ServerError::Unauthorized`]: a bad
    /// username/password pair gets 400 (matching the API this replaces),
    /// while a bad bearer token gets 401.
    #[error("{0}")]
    Rejected(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::InvalidPlayer(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            ServerError::Rejected(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            // Disabled identities get 400, matching the API this replaces.
            ServerError::Forbidden(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::UnsupportedMedia(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, self.to_string())
            }
            ServerError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            ServerError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ServerError::NotFound("record not found".to_string()),
            StoreError::DuplicateVersion { .. } => ServerError::Conflict(e.to_string()),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<ChunkError> for ServerError {
    fn from(e: ChunkError) -> Self {
        match e {
            ChunkError::InvalidPlayer(index) => ServerError::InvalidPlayer(index),
        }
    }
}

/// Map a store miss to the structured "user not found" message the
/// frontend checks for.
pub fn user_not_found(e: StoreError, username: &str) -> ServerError {
    match e {
        StoreError::NotFound => {
            ServerError::NotFound(format!("user not found: '{username}'"))
        }
        other => other.into(),
    }
}
