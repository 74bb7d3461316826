use thiserror::Error;

use crate::classify::ClassificationError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no review text provided")]
    EmptyInput,

    #[error("no valid clauses found in review")]
    NoValidClauses,

    #[error("sentiment classification failed: {0}")]
    Classification(#[from] ClassificationError),
}

impl AnalysisError {
    /// Whether the caller sent unusable input, as opposed to a model failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::NoValidClauses)
    }
}
