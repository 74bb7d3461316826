//! Sentiment classification seam.

use thiserror::Error;

use crate::review::SentimentLabel;

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("tokenize: {0}")]
    Tokenize(String),

    #[error("model inference: {0}")]
    Inference(String),

    #[error("unexpected model output: {0}")]
    UnexpectedOutput(String),

    #[error("classifier returned {got} labels for {expected} clauses")]
    LengthMismatch { expected: usize, got: usize },
}

/// Binary sentiment classifier over clauses.
///
/// `classify` returns exactly one label per input, in input order, each
/// `Positive` or `Negative`. A failure anywhere in the batch fails the whole
/// call.
pub trait SentimentModel: Send + Sync {
    fn classify(&self, clauses: &[&str]) -> Result<Vec<SentimentLabel>, ClassificationError>;

    fn classify_one(&self, clause: &str) -> Result<SentimentLabel, ClassificationError> {
        let labels = self.classify(&[clause])?;
        match labels.as_slice() {
            [label] => Ok(*label),
            _ => Err(ClassificationError::LengthMismatch {
                expected: 1,
                got: labels.len(),
            }),
        }
    }
}

impl<T: SentimentModel + ?Sized> SentimentModel for Box<T> {
    fn classify(&self, clauses: &[&str]) -> Result<Vec<SentimentLabel>, ClassificationError> {
        (**self).classify(clauses)
    }
}
