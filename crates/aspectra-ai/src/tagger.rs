//! ONNX Runtime part-of-speech tagger.
//!
//! Runs a token-classification model trained on Universal Dependencies POS
//! tags. The model directory must contain `model.onnx`, `tokenizer.json`,
//! and the Hugging Face `config.json` whose `id2label` names each output class.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use aspectra_core::{AnnotationError, PosTag, PosTagger, TaggedToken};
use ort::session::Session;
use serde::Deserialize;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::decode::{merge_word_pieces, token_tags};
use crate::encode::{self, BatchInputs};

/// Part-of-speech tagger backed by a token-classification model.
///
/// A review's clauses go through the model as one padded batch, the same way
/// the sentiment classifier batches them.
pub struct PosTaggerModel {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    labels: Vec<PosTag>,
    token_type_ids: bool,
}

#[derive(Deserialize)]
struct ModelConfig {
    id2label: HashMap<String, String>,
}

impl PosTaggerModel {
    /// Load a tagger from a directory containing `model.onnx`, `tokenizer.json`,
    /// and `config.json`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let config_path = model_dir.join("config.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );
        anyhow::ensure!(config_path.exists(), "config.json not found in {model_dir:?}");

        let config: ModelConfig = serde_json::from_str(
            &std::fs::read_to_string(&config_path).context("reading tagger config.json")?,
        )
        .context("parsing tagger config.json")?;
        let labels = label_table(&config.id2label)?;

        let session = Session::builder()?.commit_from_file(&model_path)?;
        let token_type_ids = encode::wants_token_type_ids(&session);
        let tokenizer = encode::load_tokenizer(&tokenizer_path)?;

        info!(
            model = %model_path.display(),
            labels = labels.len(),
            "loaded part-of-speech tagger"
        );
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            labels,
            token_type_ids,
        })
    }

    /// Number of tag classes the model predicts.
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }
}

impl PosTagger for PosTaggerModel {
    fn tag(&self, clause: &str) -> Result<Vec<TaggedToken>, AnnotationError> {
        self.tag_batch(&[clause])?
            .pop()
            .ok_or_else(|| AnnotationError::Inference("tagger returned no rows".into()))
    }

    /// Tag all clauses in one padded batch. Padding positions carry no word
    /// id, so they never reach the merged words.
    fn tag_batch(&self, clauses: &[&str]) -> Result<Vec<Vec<TaggedToken>>, AnnotationError> {
        if clauses.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(clauses.to_vec(), true)
            .map_err(|e| AnnotationError::Tokenize(e.to_string()))?;
        let inputs = BatchInputs::from_encodings(&encodings);
        let (batch_size, seq_len) = (inputs.batch_size, inputs.seq_len);
        if seq_len == 0 {
            return Ok(vec![vec![]; clauses.len()]);
        }

        let (dims, logits) = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| AnnotationError::Inference("session lock poisoned".into()))?;
            encode::run(&mut session, inputs, self.token_type_ids)
                .map_err(|e| AnnotationError::Inference(e.to_string()))?
        };

        // Expect logits: [batch_size, seq_len, num_labels].
        let num_labels = self.labels.len();
        if dims != [batch_size as i64, seq_len as i64, num_labels as i64] {
            return Err(AnnotationError::Inference(format!(
                "output shape {dims:?}, expected [{batch_size}, {seq_len}, {num_labels}]"
            )));
        }

        let tags = token_tags(&logits, &self.labels);
        debug!(batch_size, seq_len, "tagged clauses");

        Ok(clauses
            .iter()
            .zip(&encodings)
            .zip(tags.chunks_exact(seq_len))
            .map(|((clause, encoding), row)| {
                merge_word_pieces(clause, encoding.get_word_ids(), encoding.get_offsets(), row)
            })
            .collect())
    }
}

/// Order `id2label` by class index. Indices must be `0..n` with no gaps.
fn label_table(id2label: &HashMap<String, String>) -> anyhow::Result<Vec<PosTag>> {
    let mut labels = vec![None; id2label.len()];
    for (id, name) in id2label {
        let index: usize = id
            .parse()
            .with_context(|| format!("id2label key {id:?} is not an index"))?;
        let slot = labels
            .get_mut(index)
            .with_context(|| format!("id2label index {index} out of range"))?;
        *slot = Some(name.parse::<PosTag>()?);
    }
    labels
        .into_iter()
        .enumerate()
        .map(|(i, tag)| tag.with_context(|| format!("id2label has no entry for {i}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn model_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("models")
            .join("pos-tagger")
    }

    fn require_model() -> PathBuf {
        let dir = model_dir();
        if !dir.join("model.onnx").exists() {
            panic!(
                "Model not found. Export a UPOS token-classification model to ONNX:\n  \
                 optimum-cli export onnx --model vblagoje/bert-english-uncased-finetuned-pos \
                 --task token-classification models/pos-tagger"
            );
        }
        dir
    }

    fn id2label(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn label_table_orders_by_index() {
        let table =
            label_table(&id2label(&[("2", "ADJ"), ("0", "NOUN"), ("1", "PROPN")])).unwrap();
        assert_eq!(table, vec![PosTag::Noun, PosTag::Propn, PosTag::Adj]);
    }

    #[test]
    fn label_table_rejects_gaps() {
        assert!(label_table(&id2label(&[("0", "NOUN"), ("2", "ADJ")])).is_err());
    }

    #[test]
    fn label_table_rejects_non_numeric_ids() {
        assert!(label_table(&id2label(&[("noun", "NOUN")])).is_err());
    }

    #[test]
    fn config_parses_hugging_face_layout() {
        let config: ModelConfig = serde_json::from_str(
            r#"{"architectures": ["BertForTokenClassification"],
                "id2label": {"0": "ADJ", "1": "NOUN"},
                "label2id": {"ADJ": 0, "NOUN": 1}}"#,
        )
        .unwrap();
        assert_eq!(label_table(&config.id2label).unwrap().len(), 2);
    }

    #[test]
    #[ignore = "requires models/pos-tagger"]
    fn load_model() {
        let tagger = PosTaggerModel::load(&require_model()).unwrap();
        assert!(tagger.label_count() >= 17);
    }

    #[test]
    #[ignore = "requires models/pos-tagger"]
    fn tags_nouns_and_adjectives() {
        let tagger = PosTaggerModel::load(&require_model()).unwrap();
        let tokens = tagger.tag("The pizza was delicious").unwrap();

        let pizza = tokens.iter().find(|t| t.text == "pizza").unwrap();
        assert_eq!(pizza.pos, PosTag::Noun);
        let delicious = tokens.iter().find(|t| t.text == "delicious").unwrap();
        assert_eq!(delicious.pos, PosTag::Adj);
    }

    #[test]
    #[ignore = "requires models/pos-tagger"]
    fn batch_matches_single_clauses() {
        let tagger = PosTaggerModel::load(&require_model()).unwrap();
        let clauses = ["The pizza was delicious", "Service was slow at Luigi's"];
        let batch = tagger.tag_batch(&clauses).unwrap();
        assert_eq!(batch.len(), clauses.len());
        for (clause, tokens) in clauses.iter().zip(&batch) {
            assert_eq!(&tagger.tag(clause).unwrap(), tokens, "{clause}");
        }
    }

    #[test]
    #[ignore = "requires models/pos-tagger"]
    fn word_text_comes_from_clause() {
        let tagger = PosTaggerModel::load(&require_model()).unwrap();
        let tokens = tagger.tag("Unbelievably Crunchy fries!").unwrap();
        let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["Unbelievably", "Crunchy", "fries", "!"]);
    }
}
