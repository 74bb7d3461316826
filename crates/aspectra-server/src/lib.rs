//! HTTP service around the analysis pipeline: `/analyze`, `/feedback`,
//! `/metrics`, and `/health`.

use std::net::SocketAddr;
use std::sync::Arc;

use aspectra_core::Pipeline;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod api;
mod error;
pub mod feedback;
pub mod metrics;

pub use error::ApiError;
pub use feedback::{FeedbackError, FeedbackLog, FeedbackRecord, FeedbackRequest};
pub use metrics::Metrics;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub feedback: Arc<FeedbackLog>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, feedback: FeedbackLog, metrics: Metrics) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            feedback: Arc::new(feedback),
            metrics: Arc::new(metrics),
        }
    }
}

/// Build the application router. Every route answers cross-origin requests.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/analyze", post(api::analyze))
        .route("/feedback", post(api::submit_feedback))
        .route("/metrics", get(api::metrics))
        .route("/health", get(api::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "aspectra listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
