//! Local inference layer: ONNX Runtime models behind the pipeline's
//! `SentimentModel` and `PosTagger` seams.

pub mod decode;

#[cfg(feature = "onnx")]
mod classifier;
#[cfg(feature = "onnx")]
mod encode;
#[cfg(feature = "onnx")]
mod tagger;

#[cfg(feature = "onnx")]
pub use classifier::SentimentClassifier;
#[cfg(feature = "onnx")]
pub use tagger::PosTaggerModel;
