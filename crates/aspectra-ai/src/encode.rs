//! Tokenizer setup and flat input tensors shared by the ONNX models.

use std::path::Path;

use ort::session::Session;
use tokenizers::{Encoding, Tokenizer};

/// Longest input the transformer models accept.
pub(crate) const MAX_TOKENS: usize = 512;

/// Load `tokenizer.json`, truncating to [`MAX_TOKENS`] and padding every
/// input in a batch to the longest one.
pub(crate) fn load_tokenizer(path: &Path) -> anyhow::Result<Tokenizer> {
    let mut tokenizer =
        Tokenizer::from_file(path).map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;

    tokenizer
        .with_truncation(Some(tokenizers::TruncationParams {
            max_length: MAX_TOKENS,
            ..Default::default()
        }))
        .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;

    tokenizer.with_padding(Some(tokenizers::PaddingParams {
        ..Default::default()
    }));

    Ok(tokenizer)
}

/// Whether the model graph declares a `token_type_ids` input. BERT does,
/// DistilBERT does not.
pub(crate) fn wants_token_type_ids(session: &Session) -> bool {
    session
        .inputs()
        .iter()
        .any(|input| input.name() == "token_type_ids")
}

/// Row-major `[batch, seq_len]` model inputs built from padded encodings.
pub(crate) struct BatchInputs {
    pub batch_size: usize,
    pub seq_len: usize,
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub token_type_ids: Vec<i64>,
}

impl BatchInputs {
    /// Lay encodings out row by row. Shorter rows are zero-padded, which the
    /// attention mask marks as ignored.
    pub fn from_encodings(encodings: &[Encoding]) -> Self {
        let batch_size = encodings.len();
        let seq_len = encodings.iter().map(Encoding::len).max().unwrap_or(0);
        let cells = batch_size * seq_len;

        let mut inputs = Self {
            batch_size,
            seq_len,
            input_ids: vec![0; cells],
            attention_mask: vec![0; cells],
            token_type_ids: vec![0; cells],
        };
        if seq_len == 0 {
            return inputs;
        }

        let rows = inputs
            .input_ids
            .chunks_exact_mut(seq_len)
            .zip(inputs.attention_mask.chunks_exact_mut(seq_len))
            .zip(inputs.token_type_ids.chunks_exact_mut(seq_len));
        for (((ids, mask), types), encoding) in rows.zip(encodings) {
            widen_into(ids, encoding.get_ids());
            widen_into(mask, encoding.get_attention_mask());
            widen_into(types, encoding.get_type_ids());
        }
        inputs
    }

    pub fn shape(&self) -> [i64; 2] {
        [self.batch_size as i64, self.seq_len as i64]
    }
}

fn widen_into(row: &mut [i64], values: &[u32]) {
    for (cell, &value) in row.iter_mut().zip(values) {
        *cell = i64::from(value);
    }
}

/// Run `session` over `inputs` and return the first output as flat `f32`
/// data with its shape.
pub(crate) fn run(
    session: &mut Session,
    inputs: BatchInputs,
    with_token_types: bool,
) -> Result<(Vec<i64>, Vec<f32>), ort::Error> {
    use ort::value::Tensor;

    let shape = inputs.shape();
    let ids = Tensor::from_array((shape, inputs.input_ids.into_boxed_slice()))?;
    let mask = Tensor::from_array((shape, inputs.attention_mask.into_boxed_slice()))?;

    let outputs = if with_token_types {
        let types = Tensor::from_array((shape, inputs.token_type_ids.into_boxed_slice()))?;
        session.run(ort::inputs![
            "input_ids" => ids,
            "attention_mask" => mask,
            "token_type_ids" => types,
        ])?
    } else {
        session.run(ort::inputs![
            "input_ids" => ids,
            "attention_mask" => mask,
        ])?
    };

    let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
    let dims: &[i64] = output_shape;
    Ok((dims.to_vec(), output_data.to_vec()))
}
