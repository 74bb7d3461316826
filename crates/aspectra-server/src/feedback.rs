//! Append-only feedback log.
//!
//! Each accepted submission becomes one JSON line in a flat file. The log is
//! only touched by the feedback handler; the analysis pipeline never reads it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Invalid feedback rating")]
    InvalidRating,

    #[error("Feedback must include a rating or a correctness flag")]
    Empty,

    #[error("feedback log I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("feedback encoding: {0}")]
    Json(#[from] serde_json::Error),
}

/// Body of `POST /feedback`.
///
/// `feedback` is accepted as an alias of `rating`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default, alias = "feedback")]
    pub rating: Option<i64>,
    #[serde(default)]
    pub correct: Option<bool>,
    #[serde(default)]
    pub review: Option<String>,
}

/// A validated feedback submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Star rating, 1 to 5.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    /// Whether the user judged the prediction correct.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    /// RFC 3339 timestamp string.
    pub received_at: String,
}

impl FeedbackRecord {
    /// Validate a request. Ratings must be 1 to 5; at least one of rating
    /// and correctness must be given.
    pub fn from_request(request: FeedbackRequest) -> Result<Self, FeedbackError> {
        let rating = match request.rating {
            Some(value @ 1..=5) => Some(value as u8),
            Some(_) => return Err(FeedbackError::InvalidRating),
            None => None,
        };
        if rating.is_none() && request.correct.is_none() {
            return Err(FeedbackError::Empty);
        }

        Ok(Self {
            rating,
            correct: request.correct,
            review: request.review.filter(|r| !r.trim().is_empty()),
            received_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

/// Flat JSON Lines file of feedback records.
pub struct FeedbackLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. Concurrent appends are serialised so lines never
    /// interleave.
    pub async fn append(&self, record: &FeedbackRecord) -> Result<(), FeedbackError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        info!(
            rating = record.rating,
            correct = record.correct,
            "feedback recorded"
        );
        Ok(())
    }

    /// Read every record back, oldest first. A missing file is an empty log.
    pub async fn records(&self) -> Result<Vec<FeedbackRecord>, FeedbackError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(FeedbackError::from))
            .collect()
    }
}
