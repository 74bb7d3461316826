//! Review analysis pipeline: segment, classify and annotate, aggregate.

use std::time::Instant;

use tracing::{debug, error};

use crate::aggregate::{overall_sentiment, sentiment_percentage};
use crate::annotate::{PosTagger, annotate_batch};
use crate::classify::{ClassificationError, SentimentModel};
use crate::error::AnalysisError;
use crate::review::{AnalysisResult, Clause, ClauseResult};
use crate::segment::segment;

/// The analysis pipeline.
///
/// Built once at startup around a loaded classifier and tagger, then shared
/// by reference across requests. Annotation runs on a bounded worker pool
/// owned by the pipeline, concurrently with batch classification. Nothing in
/// the pipeline is mutated after construction.
pub struct Pipeline {
    classifier: Box<dyn SentimentModel>,
    tagger: Box<dyn PosTagger>,
    pool: rayon::ThreadPool,
}

impl Pipeline {
    /// Build a pipeline with a worker pool of `workers` threads
    /// (0 = one per CPU).
    pub fn new(
        classifier: impl SentimentModel + 'static,
        tagger: impl PosTagger + 'static,
        workers: usize,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("aspectra-worker-{i}"))
            .build()?;
        Ok(Self {
            classifier: Box::new(classifier),
            tagger: Box::new(tagger),
            pool,
        })
    }

    /// Number of threads in the annotation pool.
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Analyze one review.
    ///
    /// Blank input and input with no usable clause are rejected before any
    /// model runs. A classification failure fails the whole request; a
    /// tagging failure only empties that clause's aspects and sentiment words.
    pub fn analyze(&self, review: &str) -> Result<AnalysisResult, AnalysisError> {
        if review.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let clauses = segment(review);
        if clauses.is_empty() {
            return Err(AnalysisError::NoValidClauses);
        }

        let start = Instant::now();
        let texts: Vec<&str> = clauses.iter().map(Clause::as_str).collect();
        let tagger: &dyn PosTagger = &*self.tagger;

        // Both branches must finish before aggregation. Annotation results
        // come back in clause order regardless of completion order.
        let (sentiments, annotations) = self.pool.install(|| {
            rayon::join(
                || self.classifier.classify(&texts),
                || annotate_batch(tagger, &texts),
            )
        });

        let sentiments = sentiments.inspect_err(|e| {
            error!(error = %e, clauses = clauses.len(), "sentiment classification failed");
        })?;
        if sentiments.len() != clauses.len() {
            error!(
                expected = clauses.len(),
                got = sentiments.len(),
                "classifier broke the one-label-per-clause contract"
            );
            return Err(ClassificationError::LengthMismatch {
                expected: clauses.len(),
                got: sentiments.len(),
            }
            .into());
        }

        let overall = overall_sentiment(&sentiments).ok_or(AnalysisError::NoValidClauses)?;
        let percentages = sentiment_percentage(&sentiments);

        let analysis: Vec<ClauseResult> = clauses
            .into_iter()
            .zip(sentiments)
            .zip(annotations)
            .map(|((clause, sentiment), annotation)| ClauseResult {
                clause,
                aspects: annotation.aspects,
                sentiment,
                sentiment_words: annotation.sentiment_words,
            })
            .collect();

        debug!(
            clauses = analysis.len(),
            overall = %overall,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "analyzed review"
        );

        Ok(AnalysisResult {
            review: review.to_string(),
            overall_sentiment: overall,
            sentiment_percentages: percentages,
            analysis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::tests::{FailingTagger, LexiconTagger};
    use crate::annotate::{AnnotationError, PosTag, TaggedToken};
    use crate::classify::tests::{BrokenModel, KeywordModel, ShortModel};
    use crate::review::SentimentLabel;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const REVIEW: &str = "The food was great. The service was slow but the staff was kind.";

    fn lexicon() -> LexiconTagger {
        LexiconTagger::new(&[
            ("food", PosTag::Noun),
            ("service", PosTag::Noun),
            ("staff", PosTag::Noun),
            ("great", PosTag::Adj),
            ("slow", PosTag::Adj),
            ("kind", PosTag::Adj),
        ])
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(KeywordModel::new(&["slow"]), lexicon(), 4).unwrap()
    }

    /// Wraps a classifier so tests can read its call counter after the
    /// pipeline takes ownership.
    struct Shared(Arc<KeywordModel>);

    impl SentimentModel for Shared {
        fn classify(
            &self,
            clauses: &[&str],
        ) -> Result<Vec<SentimentLabel>, ClassificationError> {
            self.0.classify(clauses)
        }
    }

    /// Sleeps longer for earlier clauses so completion order is reversed.
    struct SlowFirstTagger {
        inner: LexiconTagger,
    }

    impl PosTagger for SlowFirstTagger {
        fn tag(&self, clause: &str) -> Result<Vec<TaggedToken>, AnnotationError> {
            let delay = match clause.split_whitespace().nth(1) {
                Some("food") => 60,
                Some("service") => 30,
                _ => 0,
            };
            std::thread::sleep(Duration::from_millis(delay));
            self.inner.tag(clause)
        }
    }

    #[test]
    fn analyzes_restaurant_review() {
        let result = pipeline().analyze(REVIEW).unwrap();

        assert_eq!(result.review, REVIEW);
        assert_eq!(result.overall_sentiment, SentimentLabel::Positive);
        assert_eq!(result.sentiment_percentages.positive_percentage, 66.67);
        assert_eq!(result.sentiment_percentages.negative_percentage, 33.33);

        let sentences: Vec<&str> = result.analysis.iter().map(|r| r.clause.as_str()).collect();
        assert_eq!(
            sentences,
            vec![
                "The food was great.",
                "The service was slow",
                "the staff was kind."
            ]
        );
        assert_eq!(result.analysis[0].aspects, vec!["food"]);
        assert_eq!(result.analysis[0].sentiment_words, vec!["great"]);
        assert_eq!(result.analysis[1].sentiment, SentimentLabel::Negative);
        assert_eq!(result.analysis[1].sentiment_words, vec!["slow"]);
        assert_eq!(result.analysis[2].aspects, vec!["staff"]);
    }

    #[test]
    fn preserves_clause_order_under_parallel_annotation() {
        let pipeline = Pipeline::new(
            KeywordModel::new(&["slow"]),
            SlowFirstTagger { inner: lexicon() },
            3,
        )
        .unwrap();

        let result = pipeline.analyze(REVIEW).unwrap();
        let aspects: Vec<&[String]> = result.analysis.iter().map(|r| r.aspects.as_slice()).collect();
        assert_eq!(
            aspects,
            vec![
                &["food".to_string()][..],
                &["service".to_string()][..],
                &["staff".to_string()][..]
            ]
        );
    }

    #[test]
    fn classifies_in_one_batch() {
        let model = Arc::new(KeywordModel::new(&["slow"]));
        let pipeline = Pipeline::new(Shared(model.clone()), lexicon(), 2).unwrap();
        pipeline.analyze(REVIEW).unwrap();
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rejects_blank_input_before_classifying() {
        let model = Arc::new(KeywordModel::new(&[]));
        let pipeline = Pipeline::new(Shared(model.clone()), lexicon(), 2).unwrap();

        for review in ["", "   ", "\n\t"] {
            let err = pipeline.analyze(review).unwrap_err();
            assert!(matches!(err, AnalysisError::EmptyInput), "{review:?}: {err}");
            assert!(err.is_client_error());
        }
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn rejects_punctuation_only_input() {
        let model = Arc::new(KeywordModel::new(&[]));
        let pipeline = Pipeline::new(Shared(model.clone()), lexicon(), 2).unwrap();

        let err = pipeline.analyze(" ... !? ").unwrap_err();
        assert!(matches!(err, AnalysisError::NoValidClauses));
        assert!(err.is_client_error());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn emoji_only_review_is_analyzed() {
        let result = pipeline().analyze("😍😍😍").unwrap();
        assert_eq!(result.analysis.len(), 1);
        assert_eq!(result.analysis[0].clause.as_str(), "😍😍😍");
        assert!(result.analysis[0].aspects.is_empty());
        assert_eq!(result.overall_sentiment, SentimentLabel::Positive);
    }

    #[test]
    fn classification_failure_fails_request() {
        let pipeline = Pipeline::new(BrokenModel, lexicon(), 2).unwrap();
        let err = pipeline.analyze(REVIEW).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Classification(ClassificationError::Inference(_))
        ));
        assert!(!err.is_client_error());
    }

    #[test]
    fn short_classifier_output_is_an_error() {
        let pipeline = Pipeline::new(ShortModel, lexicon(), 2).unwrap();
        let err = pipeline.analyze(REVIEW).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Classification(ClassificationError::LengthMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn tagger_failure_keeps_sentiment() {
        let pipeline = Pipeline::new(KeywordModel::new(&["slow"]), FailingTagger, 2).unwrap();
        let result = pipeline.analyze(REVIEW).unwrap();

        assert_eq!(result.analysis.len(), 3);
        assert_eq!(result.analysis[1].sentiment, SentimentLabel::Negative);
        assert!(result.analysis.iter().all(|r| r.aspects.is_empty()));
        assert!(result.analysis.iter().all(|r| r.sentiment_words.is_empty()));
    }

    #[test]
    fn tie_yields_neutral_verdict() {
        let result = pipeline()
            .analyze("The food was great but the service was slow")
            .unwrap();
        assert_eq!(result.overall_sentiment, SentimentLabel::Neutral);
        assert_eq!(result.sentiment_percentages.positive_percentage, 50.0);
        assert_eq!(result.sentiment_percentages.negative_percentage, 50.0);
    }

    #[test]
    fn single_clause_review() {
        let result = pipeline().analyze("  Slow kitchen  ").unwrap();
        assert_eq!(result.review, "  Slow kitchen  ");
        assert_eq!(result.analysis.len(), 1);
        assert_eq!(result.analysis[0].clause.as_str(), "Slow kitchen");
        assert_eq!(result.overall_sentiment, SentimentLabel::Negative);
        assert_eq!(result.sentiment_percentages.negative_percentage, 100.0);
    }

    #[test]
    fn analysis_is_idempotent() {
        let pipeline = pipeline();
        let first = pipeline.analyze(REVIEW).unwrap();
        let second = pipeline.analyze(REVIEW).unwrap();
        assert_eq!(first.overall_sentiment, second.overall_sentiment);
        assert_eq!(first.sentiment_percentages, second.sentiment_percentages);
        assert_eq!(first, second);
    }

    #[test]
    fn shared_across_threads() {
        let pipeline = Arc::new(pipeline());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = pipeline.clone();
                std::thread::spawn(move || pipeline.analyze(REVIEW).unwrap())
            })
            .collect();
        for handle in handles {
            let result = handle.join().unwrap();
            assert_eq!(result.overall_sentiment, SentimentLabel::Positive);
        }
    }

    #[test]
    fn worker_count_is_bounded() {
        let pipeline = Pipeline::new(KeywordModel::new(&[]), lexicon(), 3).unwrap();
        assert_eq!(pipeline.workers(), 3);
    }
}
