use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde_json::{Value, json};

use crate::feedback::{FeedbackError, FeedbackRecord, FeedbackRequest};
use crate::{ApiError, AppState};

/// POST /feedback
///
/// Validates a rating and/or correctness flag, appends it to the feedback
/// log, and counts it. Malformed bodies are reported as an invalid rating.
pub async fn submit_feedback(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload.map_err(|_| FeedbackError::InvalidRating)?;
    let record = FeedbackRecord::from_request(request)?;

    state.feedback.append(&record).await?;
    state.metrics.record_feedback(&record);

    Ok(Json(json!({ "message": "Feedback submitted successfully!" })))
}
