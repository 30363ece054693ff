//! JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::Error;
use crate::keys::KeyRejection;

/// Body of every error response: `{"error": "..."}`, plus the counters when a
/// key hit its limit.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
                usage: None,
                limit: None,
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn rate_limited(usage: u64, limit: u64) -> Self {
        let mut err = Self::new(StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded");
        err.body.usage = Some(usage);
        err.body.limit = Some(limit);
        err
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Log `err` and answer with a fixed 500 message that does not leak
    /// storage details.
    pub fn storage(context: &str, err: Error) -> Self {
        tracing::error!(error = %err, "{}", context);
        Self::internal(context)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<KeyRejection> for ApiError {
    fn from(rejection: KeyRejection) -> Self {
        match rejection {
            KeyRejection::Missing | KeyRejection::Invalid => Self::unauthorized(rejection.to_string()),
            KeyRejection::RateLimited { usage, limit } => Self::rate_limited(usage, limit),
            KeyRejection::UsageUpdate(_) | KeyRejection::Lookup(_) => {
                Self::internal(rejection.to_string())
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match &err {
            Error::InvalidGitHubUrl(_) => Self::bad_request(err.to_string()),
            Error::RepoNotFound(_) => Self::not_found(err.to_string()),
            Error::RateLimited(_) => Self::unavailable(err.to_string()),
            _ => {
                tracing::error!(error = %err, "Request failed");
                Self::internal(err.to_string())
            }
        }
    }
}
