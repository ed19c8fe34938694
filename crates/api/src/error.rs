//! Error types for REST API operations.
//!
//! Per §7's error taxonomy, the HTTP surface only ever distinguishes two
//! failure classes at request time: a malformed request (400) and an
//! internal failure (500). Per-schema Judge/parse failures are never raised
//! here — they are localized inside the engine and surfaced inline in a
//! result's `error`/`reasoning` fields.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// Malformed body, unknown scheme id, empty text (400).
    BadRequest(String),
    /// Engine/registry failure reached at request time (500).
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = ErrorResponse { status_code: status.as_u16(), message };
        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("invalid JSON: {err}"))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
