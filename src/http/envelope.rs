//! JSON response envelope and error mapping.

use crate::gateway::services::DispatchError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

const SUCCESS_MESSAGE: &str = "success";

/// Body shape shared by every API response.
///
/// `code` mirrors the HTTP status; `data` is omitted on errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// HTTP status code.
    pub code: u16,
    /// `"success"` or a human-readable error.
    pub message: String,
    /// Response payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Wraps `data` in a 200 envelope.
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            message: SUCCESS_MESSAGE.to_owned(),
            data: Some(data),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Failure of an API request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The gateway could not complete the operation.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The request body is not a JSON object.
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Dispatch(
                DispatchError::UnknownServer { .. }
                | DispatchError::ServerUnavailable { .. }
                | DispatchError::NoToolsAvailable { .. },
            ) => StatusCode::NOT_FOUND,
            Self::Dispatch(DispatchError::InvocationFailed { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(status = status.as_u16(), error = %self, "request failed");
        Envelope::<()> {
            code: status.as_u16(),
            message: self.to_string(),
            data: None,
        }
        .into_response()
    }
}
