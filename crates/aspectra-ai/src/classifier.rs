//! ONNX Runtime sentence-sentiment classifier.
//!
//! Runs a fine-tuned binary sequence-classification model (DistilBERT in
//! production) exported to ONNX. The model directory must contain
//! `model.onnx` and `tokenizer.json`. Output class 1 is positive, class 0
//! negative.

use std::path::Path;
use std::sync::Mutex;

use aspectra_core::{ClassificationError, SentimentLabel, SentimentModel};
use ort::session::Session;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::decode::sentiment_labels;
use crate::encode::{self, BatchInputs};

/// Binary sentiment classifier over clauses.
///
/// Inference needs exclusive access to the ONNX session, so batches are
/// serialised behind a mutex; tokenization happens outside it.
pub struct SentimentClassifier {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    token_type_ids: bool,
}

impl SentimentClassifier {
    /// Load a classifier from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?.commit_from_file(&model_path)?;
        let token_type_ids = encode::wants_token_type_ids(&session);
        let tokenizer = encode::load_tokenizer(&tokenizer_path)?;

        info!(
            model = %model_path.display(),
            token_type_ids,
            "loaded sentiment model"
        );
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            token_type_ids,
        })
    }
}

impl SentimentModel for SentimentClassifier {
    fn classify(&self, clauses: &[&str]) -> Result<Vec<SentimentLabel>, ClassificationError> {
        if clauses.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(clauses.to_vec(), true)
            .map_err(|e| ClassificationError::Tokenize(e.to_string()))?;
        let inputs = BatchInputs::from_encodings(&encodings);
        let batch_size = inputs.batch_size;
        let seq_len = inputs.seq_len;

        let (dims, logits) = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| ClassificationError::Inference("session lock poisoned".into()))?;
            encode::run(&mut session, inputs, self.token_type_ids)
                .map_err(|e| ClassificationError::Inference(e.to_string()))?
        };

        // Expect logits: [batch_size, num_labels].
        let num_labels = match dims.as_slice() {
            [b, n] if *b as usize == batch_size => *n as usize,
            _ => {
                return Err(ClassificationError::UnexpectedOutput(format!(
                    "output shape {dims:?}, expected [{batch_size}, 2]"
                )));
            }
        };

        debug!(batch_size, seq_len, "classified clauses");
        sentiment_labels(&logits, batch_size, num_labels)
    }
}
