//! Prometheus counters for analysis requests and feedback.
//!
//! `feedback_rating_summary` is exported as its `_sum` and `_count` series;
//! the `prometheus` crate has no summary type, so no quantiles are published.

use std::time::Duration;

use prometheus::{
    Counter, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

use crate::feedback::FeedbackRecord;

/// Outcome label of an `/analyze` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Ok,
    Rejected,
    Failed,
}

impl AnalysisOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

pub struct Metrics {
    registry: Registry,
    feedback_count: IntCounterVec,
    feedback_rating: Histogram,
    rating_sum: Counter,
    rating_count: IntCounter,
    feedback_correctness: IntCounterVec,
    analyze_requests: IntCounterVec,
    analyze_duration: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let feedback_count = IntCounterVec::new(
            Opts::new("feedback_count", "Count of feedback received by rating"),
            &["rating"],
        )?;
        let feedback_rating = Histogram::with_opts(
            HistogramOpts::new("feedback_rating_histogram", "Histogram of feedback ratings")
                .buckets(vec![1.0, 2.0, 3.0, 4.0, 5.0]),
        )?;
        let rating_sum = Counter::new(
            "feedback_rating_summary_sum",
            "Sum of all feedback ratings",
        )?;
        let rating_count = IntCounter::new(
            "feedback_rating_summary_count",
            "Number of feedback ratings",
        )?;
        let feedback_correctness = IntCounterVec::new(
            Opts::new(
                "feedback_correctness_count",
                "Count of feedback judging a prediction correct or incorrect",
            ),
            &["correct"],
        )?;
        let analyze_requests = IntCounterVec::new(
            Opts::new("analyze_requests_total", "Analysis requests by outcome"),
            &["outcome"],
        )?;
        let analyze_duration = Histogram::with_opts(HistogramOpts::new(
            "analyze_duration_seconds",
            "Time spent analyzing a review",
        ))?;

        registry.register(Box::new(feedback_count.clone()))?;
        registry.register(Box::new(feedback_rating.clone()))?;
        registry.register(Box::new(rating_sum.clone()))?;
        registry.register(Box::new(rating_count.clone()))?;
        registry.register(Box::new(feedback_correctness.clone()))?;
        registry.register(Box::new(analyze_requests.clone()))?;
        registry.register(Box::new(analyze_duration.clone()))?;

        Ok(Self {
            registry,
            feedback_count,
            feedback_rating,
            rating_sum,
            rating_count,
            feedback_correctness,
            analyze_requests,
            analyze_duration,
        })
    }

    pub fn record_feedback(&self, record: &FeedbackRecord) {
        if let Some(rating) = record.rating {
            self.feedback_count
                .with_label_values(&[rating.to_string().as_str()])
                .inc();
            self.feedback_rating.observe(f64::from(rating));
            self.rating_sum.inc_by(f64::from(rating));
            self.rating_count.inc();
        }
        if let Some(correct) = record.correct {
            self.feedback_correctness
                .with_label_values(&[if correct { "true" } else { "false" }])
                .inc();
        }
    }

    pub fn record_analysis(&self, outcome: AnalysisOutcome, elapsed: Duration) {
        self.analyze_requests
            .with_label_values(&[outcome.as_str()])
            .inc();
        if outcome == AnalysisOutcome::Ok {
            self.analyze_duration.observe(elapsed.as_secs_f64());
        }
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}
