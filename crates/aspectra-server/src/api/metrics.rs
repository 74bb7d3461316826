use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::{ApiError, AppState};

/// GET /metrics
///
/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| ApiError::Internal(format!("render metrics: {e}")))?;
    Ok(([(header::CONTENT_TYPE, state.metrics.content_type())], body))
}
