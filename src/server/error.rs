//! Endpoint error payloads.
//!
//! Each endpoint fails with its own fixed 500 body; the underlying
//! [`PipelineError`] is only logged.

use crate::errors::PipelineError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub const FEED_ERROR_MESSAGE: &str = "Error generating RSS feed";
pub const UPDATE_ERROR_MESSAGE: &str = "Failed to process update.";

/// JSON body of a failed update check.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A failed request, tagged with the endpoint that failed.
#[derive(Debug)]
pub enum ApiError {
    /// `/feed` failure, answered with plain text.
    Feed(PipelineError),
    /// `/update` failure, answered with JSON.
    Update(PipelineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Feed(err) => {
                tracing::error!(error = %err, "Feed generation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, FEED_ERROR_MESSAGE).into_response()
            }
            ApiError::Update(err) => {
                tracing::error!(error = %err, "Update check failed");
                let body = ErrorBody {
                    error: UPDATE_ERROR_MESSAGE.to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Feed(err) => write!(f, "{FEED_ERROR_MESSAGE}: {err}"),
            ApiError::Update(err) => write!(f, "{UPDATE_ERROR_MESSAGE} {err}"),
        }
    }
}

impl std::error::Error for ApiError {}
