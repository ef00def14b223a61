//! HTTP API data models

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cmdrelay_core::api::TriggerError;
use serde::Serialize;

pub const UNAUTHORIZED: &str = "Unauthorized";
pub const TOO_MANY_REQUESTS: &str = "Too many requests, please try again later.";

// ============= Health =============

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

// ============= Errors =============

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct FailureResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug)]
pub enum HttpServerError {
    Unauthorized,
    TooManyRequests,
    /// Trigger could not start because the command is not configured.
    Configuration(String),
}

impl From<TriggerError> for HttpServerError {
    fn from(e: TriggerError) -> Self {
        match e {
            TriggerError::Configuration(msg) => Self::Configuration(msg),
        }
    }
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: UNAUTHORIZED.to_string(),
                }),
            )
                .into_response(),
            Self::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse {
                    error: TOO_MANY_REQUESTS.to_string(),
                }),
            )
                .into_response(),
            Self::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(FailureResponse {
                    success: false,
                    error: msg,
                }),
            )
                .into_response(),
        }
    }
}
