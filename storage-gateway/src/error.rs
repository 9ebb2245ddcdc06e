use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced to HTTP clients
///
/// Client input problems map to 400. Storage failures map to 500 and carry the
/// backend's error text in the response body.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Failed to upload file: {0}")]
    Upload(#[source] StorageError),

    #[error("Error listing objects: {0}")]
    List(#[source] StorageError),

    #[error("Failed to download object: {0}")]
    Download(#[source] StorageError),
}

impl GatewayError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        GatewayError::BadRequest(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Upload(_) | GatewayError::List(_) | GatewayError::Download(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
