//! Core types and the aspect-based sentiment analysis pipeline.

pub mod aggregate;
pub mod annotate;
pub mod classify;
mod error;
pub mod pipeline;
pub mod review;
pub mod segment;

pub use aggregate::{overall_sentiment, sentiment_percentage};
pub use annotate::{
    Annotation, AnnotationError, PosTag, PosTagger, TaggedToken, annotate_batch,
};
pub use classify::{ClassificationError, SentimentModel};
pub use error::AnalysisError;
pub use pipeline::Pipeline;
pub use review::{AnalysisResult, Clause, ClauseResult, SentimentLabel, SentimentPercentages};
pub use segment::segment;
