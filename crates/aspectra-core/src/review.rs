//! Review analysis types shared between the pipeline and the HTTP layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentiment of a clause or of a whole review.
///
/// Individual clauses are only ever `Positive` or `Negative`. `Neutral` is
/// reserved for the overall verdict when both counts tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Neutral => "NEUTRAL",
        }
    }

    /// Map a binary classifier's arg-max index to a label.
    ///
    /// The model was trained with 0 = negative, 1 = positive.
    pub fn from_class_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Negative),
            1 => Some(Self::Positive),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trimmed, non-empty fragment of a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Clause(String);

impl Clause {
    /// Build a clause from a raw fragment. Returns `None` if the fragment is
    /// blank after trimming.
    pub fn new(fragment: &str) -> Option<Self> {
        let trimmed = fragment.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Clause {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Analysis of a single clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseResult {
    #[serde(rename = "sentence")]
    pub clause: Clause,
    /// Lower-cased nouns and proper nouns, in source order (duplicates kept).
    pub aspects: Vec<String>,
    pub sentiment: SentimentLabel,
    /// Adjectives as written in the clause.
    pub sentiment_words: Vec<String>,
}

/// Share of positive and negative clauses, in percent, rounded to 2 places.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentPercentages {
    pub positive_percentage: f64,
    pub negative_percentage: f64,
}

/// Full analysis of one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub review: String,
    pub overall_sentiment: SentimentLabel,
    pub sentiment_percentages: SentimentPercentages,
    /// One entry per clause, in segmentation order.
    pub analysis: Vec<ClauseResult>,
}
