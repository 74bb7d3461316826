//! Turning raw model outputs into pipeline labels.
//!
//! Kept free of ONNX types so the decoding rules are testable without a
//! model on disk.

use aspectra_core::{ClassificationError, PosTag, SentimentLabel, TaggedToken};

/// Index of the highest score. Ties go to the lowest index; NaN never wins.
pub fn argmax(row: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in row.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

/// Decode `[batch, 2]` sequence-classification logits into one label per row.
///
/// Class 1 is positive, class 0 negative. Any other shape is an error.
pub fn sentiment_labels(
    logits: &[f32],
    batch: usize,
    num_labels: usize,
) -> Result<Vec<SentimentLabel>, ClassificationError> {
    if num_labels != 2 {
        return Err(ClassificationError::UnexpectedOutput(format!(
            "expected 2 classes, model produced {num_labels}"
        )));
    }
    if logits.len() != batch * num_labels {
        return Err(ClassificationError::UnexpectedOutput(format!(
            "expected {} logits for batch of {batch}, got {}",
            batch * num_labels,
            logits.len()
        )));
    }

    logits
        .chunks_exact(num_labels)
        .enumerate()
        .map(|(row, scores)| {
            argmax(scores)
                .and_then(SentimentLabel::from_class_index)
                .ok_or_else(|| {
                    ClassificationError::UnexpectedOutput(format!("no valid score in row {row}"))
                })
        })
        .collect()
}

/// Decode flat token-classification logits into one tag per token.
///
/// `logits` holds `labels.len()` scores per token; a row with no usable score
/// is tagged `X`.
pub fn token_tags(logits: &[f32], labels: &[PosTag]) -> Vec<PosTag> {
    if labels.is_empty() {
        return vec![];
    }
    logits
        .chunks_exact(labels.len())
        .map(|scores| argmax(scores).map_or(PosTag::X, |i| labels[i]))
        .collect()
}

/// Merge sub-word tag predictions back into words.
///
/// Each word takes the tag of its first sub-word; its text spans from the
/// first sub-word's start offset to the last sub-word's end offset (byte
/// offsets into `text`). Tokens without a word id are special tokens and are
/// skipped.
pub fn merge_word_pieces(
    text: &str,
    word_ids: &[Option<u32>],
    offsets: &[(usize, usize)],
    tags: &[PosTag],
) -> Vec<TaggedToken> {
    let mut spans: Vec<(u32, usize, usize, PosTag)> = Vec::new();

    for ((word, &(start, end)), &tag) in word_ids.iter().zip(offsets).zip(tags) {
        let Some(word) = *word else { continue };
        if let Some(last) = spans.last_mut()
            && last.0 == word
        {
            last.2 = end;
            continue;
        }
        spans.push((word, start, end, tag));
    }

    spans
        .into_iter()
        .filter_map(|(_, start, end, tag)| {
            text.get(start..end)
                .filter(|s| !s.is_empty())
                .map(|s| TaggedToken::new(s, tag))
        })
        .collect()
}
