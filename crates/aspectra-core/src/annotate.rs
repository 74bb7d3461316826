//! Aspect and sentiment-word extraction from part-of-speech tags.
//!
//! Extraction is token-based: every NOUN or PROPN token is an aspect
//! (lower-cased), every ADJ token is a sentiment word (as written). Duplicates
//! are kept and tokens stay in source order.

use std::str::FromStr;

use rayon::prelude::*;
use thiserror::Error;
use tracing::warn;

/// Universal Dependencies part-of-speech tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosTag {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl PosTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adj => "ADJ",
            Self::Adp => "ADP",
            Self::Adv => "ADV",
            Self::Aux => "AUX",
            Self::Cconj => "CCONJ",
            Self::Det => "DET",
            Self::Intj => "INTJ",
            Self::Noun => "NOUN",
            Self::Num => "NUM",
            Self::Part => "PART",
            Self::Pron => "PRON",
            Self::Propn => "PROPN",
            Self::Punct => "PUNCT",
            Self::Sconj => "SCONJ",
            Self::Sym => "SYM",
            Self::Verb => "VERB",
            Self::X => "X",
        }
    }

    /// Whether tokens with this tag name an aspect of the review.
    pub fn is_aspect(&self) -> bool {
        matches!(self, Self::Noun | Self::Propn)
    }
}

impl FromStr for PosTag {
    type Err = std::convert::Infallible;

    /// Parse a tag label. Accepts IOB-prefixed labels (`B-NOUN`) as emitted
    /// by some token-classification heads; anything unrecognised is `X`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s
            .strip_prefix("B-")
            .or_else(|| s.strip_prefix("I-"))
            .unwrap_or(s);
        Ok(match label.to_ascii_uppercase().as_str() {
            "ADJ" => Self::Adj,
            "ADP" => Self::Adp,
            "ADV" => Self::Adv,
            "AUX" => Self::Aux,
            "CCONJ" | "CONJ" => Self::Cconj,
            "DET" => Self::Det,
            "INTJ" => Self::Intj,
            "NOUN" => Self::Noun,
            "NUM" => Self::Num,
            "PART" => Self::Part,
            "PRON" => Self::Pron,
            "PROPN" => Self::Propn,
            "PUNCT" => Self::Punct,
            "SCONJ" => Self::Sconj,
            "SYM" => Self::Sym,
            "VERB" => Self::Verb,
            _ => Self::X,
        })
    }
}

/// A word of a clause with its part-of-speech tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
    pub text: String,
    pub pos: PosTag,
}

impl TaggedToken {
    pub fn new(text: impl Into<String>, pos: PosTag) -> Self {
        Self {
            text: text.into(),
            pos,
        }
    }
}

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("tokenize: {0}")]
    Tokenize(String),

    #[error("tagger inference: {0}")]
    Inference(String),
}

/// Part-of-speech tagger.
///
/// Implementations are loaded once and shared read-only; `tag` must be safe
/// to call concurrently for different clauses.
pub trait PosTagger: Send + Sync {
    fn tag(&self, clause: &str) -> Result<Vec<TaggedToken>, AnnotationError>;

    /// Tag several clauses, one token list per clause in input order.
    ///
    /// The default tags each clause in parallel on the current rayon pool.
    /// Model-backed taggers override this with a single padded batch.
    fn tag_batch(&self, clauses: &[&str]) -> Result<Vec<Vec<TaggedToken>>, AnnotationError> {
        clauses.par_iter().map(|clause| self.tag(clause)).collect()
    }
}

impl<T: PosTagger + ?Sized> PosTagger for Box<T> {
    fn tag(&self, clause: &str) -> Result<Vec<TaggedToken>, AnnotationError> {
        (**self).tag(clause)
    }

    fn tag_batch(&self, clauses: &[&str]) -> Result<Vec<Vec<TaggedToken>>, AnnotationError> {
        (**self).tag_batch(clauses)
    }
}

/// Aspects and sentiment words of one clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub aspects: Vec<String>,
    pub sentiment_words: Vec<String>,
}

impl Annotation {
    pub fn from_tokens(tokens: &[TaggedToken]) -> Self {
        let mut annotation = Self::default();
        for token in tokens {
            if token.pos.is_aspect() {
                annotation.aspects.push(token.text.to_lowercase());
            } else if token.pos == PosTag::Adj {
                annotation.sentiment_words.push(token.text.clone());
            }
        }
        annotation
    }
}

/// Lower-cased NOUN and PROPN tokens of `clause`.
pub fn extract_aspects(
    tagger: &dyn PosTagger,
    clause: &str,
) -> Result<Vec<String>, AnnotationError> {
    Ok(Annotation::from_tokens(&tagger.tag(clause)?).aspects)
}

/// ADJ tokens of `clause`, as written.
pub fn extract_adjectives(
    tagger: &dyn PosTagger,
    clause: &str,
) -> Result<Vec<String>, AnnotationError> {
    Ok(Annotation::from_tokens(&tagger.tag(clause)?).sentiment_words)
}

/// Tag `clause` once and extract both aspects and sentiment words.
///
/// Tagging failures are not fatal: the clause degrades to an empty
/// annotation and a warning is logged.
pub fn annotate(tagger: &dyn PosTagger, clause: &str) -> Annotation {
    match tagger.tag(clause) {
        Ok(tokens) => Annotation::from_tokens(&tokens),
        Err(e) => {
            warn!(error = %e, clause, "annotation failed, continuing without aspects");
            Annotation::default()
        }
    }
}

/// Annotate every clause, in clause order.
///
/// Tries one batch first. If the batch fails, each clause is retried on its
/// own so a single bad clause only empties its own annotation.
pub fn annotate_batch(tagger: &dyn PosTagger, clauses: &[&str]) -> Vec<Annotation> {
    match tagger.tag_batch(clauses) {
        Ok(tagged) if tagged.len() == clauses.len() => tagged
            .iter()
            .map(|tokens| Annotation::from_tokens(tokens))
            .collect(),
        Ok(tagged) => {
            warn!(
                expected = clauses.len(),
                got = tagged.len(),
                "tagger batch length mismatch, tagging clauses one by one"
            );
            annotate_each(tagger, clauses)
        }
        Err(e) => {
            warn!(error = %e, clauses = clauses.len(), "batch tagging failed, tagging clauses one by one");
            annotate_each(tagger, clauses)
        }
    }
}

fn annotate_each(tagger: &dyn PosTagger, clauses: &[&str]) -> Vec<Annotation> {
    clauses
        .par_iter()
        .map(|clause| annotate(tagger, clause))
        .collect()
}
