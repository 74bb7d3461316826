use std::time::Instant;

use aspectra_core::AnalysisResult;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;

use crate::metrics::AnalysisOutcome;
use crate::{ApiError, AppState};

/// Body of `POST /analyze`. A missing `review` is treated as empty.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub review: String,
}

/// POST /analyze
///
/// Runs the pipeline on a blocking thread; the async runtime never waits on
/// model inference.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let started = Instant::now();
    let pipeline = state.pipeline.clone();
    let result = tokio::task::spawn_blocking(move || pipeline.analyze(&request.review))
        .await
        .map_err(|e| ApiError::Internal(format!("analysis task failed: {e}")))?;

    let outcome = match &result {
        Ok(_) => AnalysisOutcome::Ok,
        Err(e) if e.is_client_error() => AnalysisOutcome::Rejected,
        Err(_) => AnalysisOutcome::Failed,
    };
    state.metrics.record_analysis(outcome, started.elapsed());

    Ok(Json(result?))
}
