//! API error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::driver::RestartError;
use crate::mapping::{StoreError, UpdateError};

/// Errors surfaced to HTTP clients as plain text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid mapping JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("unreadable request body: {0}")]
    Unreadable(String),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Restart(#[from] RestartError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("method not allowed")]
    MethodNotAllowed,
}

impl From<UpdateError> for ApiError {
    fn from(err: UpdateError) -> Self {
        match err {
            UpdateError::Restart(e) => ApiError::Restart(e),
            UpdateError::Store(e) => ApiError::Store(e),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Decode(_) | ApiError::Unreadable(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Store(_) | ApiError::Restart(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }
        (status, self.to_string()).into_response()
    }
}
