use aspectra_core::AnalysisError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::feedback::FeedbackError;

/// Error returned by a handler, rendered as `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::EmptyInput => Self::BadRequest("No review text provided".into()),
            AnalysisError::NoValidClauses => Self::BadRequest("No valid sentences found".into()),
            AnalysisError::Classification(e) => {
                error!(error = %e, "analysis failed");
                Self::Internal("Sentiment classification failed".into())
            }
        }
    }
}

impl From<FeedbackError> for ApiError {
    fn from(err: FeedbackError) -> Self {
        match err {
            FeedbackError::InvalidRating | FeedbackError::Empty => {
                Self::BadRequest(err.to_string())
            }
            FeedbackError::Io(_) | FeedbackError::Json(_) => {
                error!(error = %err, "storing feedback failed");
                Self::Internal("Failed to record feedback".into())
            }
        }
    }
}
