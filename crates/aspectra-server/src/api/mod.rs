//! HTTP handlers.

mod analyze;
mod feedback;
mod health;
mod metrics;

pub use analyze::{AnalyzeRequest, analyze};
pub use feedback::submit_feedback;
pub use health::{HealthResponse, health};
pub use metrics::metrics;
