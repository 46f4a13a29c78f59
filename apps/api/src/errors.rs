#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::session::InvalidStateError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Deliberately small: the gateway and the document writer absorb their own
/// failures before the HTTP boundary, so the only error a healthy deployment
/// ever serves is a state the client corrupted while round-tripping it.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::InvalidState(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_STATE",
                err.to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
