//! Majority-rule aggregation of clause sentiments.
//!
//! Ties between positive and negative clauses yield `Neutral`. Percentages
//! count each label separately, so they only sum to 100 when every label is
//! `Positive` or `Negative`.

use crate::review::{SentimentLabel, SentimentPercentages};

/// Overall verdict by majority rule. `None` for an empty list.
pub fn overall_sentiment(labels: &[SentimentLabel]) -> Option<SentimentLabel> {
    if labels.is_empty() {
        return None;
    }
    let (positive, negative) = counts(labels);
    Some(match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => SentimentLabel::Positive,
        std::cmp::Ordering::Less => SentimentLabel::Negative,
        std::cmp::Ordering::Equal => SentimentLabel::Neutral,
    })
}

/// Percentage of positive and negative labels, rounded to 2 decimal places.
/// Both are 0 for an empty list.
pub fn sentiment_percentage(labels: &[SentimentLabel]) -> SentimentPercentages {
    if labels.is_empty() {
        return SentimentPercentages::default();
    }
    let total = labels.len() as f64;
    let (positive, negative) = counts(labels);
    SentimentPercentages {
        positive_percentage: round2(positive as f64 / total * 100.0),
        negative_percentage: round2(negative as f64 / total * 100.0),
    }
}

fn counts(labels: &[SentimentLabel]) -> (usize, usize) {
    labels.iter().fold((0, 0), |(pos, neg), label| match label {
        SentimentLabel::Positive => (pos + 1, neg),
        SentimentLabel::Negative => (pos, neg + 1),
        SentimentLabel::Neutral => (pos, neg),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use SentimentLabel::{Negative, Neutral, Positive};

    #[test]
    fn majority_positive() {
        assert_eq!(
            overall_sentiment(&[Positive, Positive, Negative]),
            Some(Positive)
        );
    }

    #[test]
    fn majority_negative() {
        assert_eq!(
            overall_sentiment(&[Negative, Negative, Positive]),
            Some(Negative)
        );
    }

    #[test]
    fn tie_is_neutral() {
        assert_eq!(overall_sentiment(&[Positive, Negative]), Some(Neutral));
        assert_eq!(
            overall_sentiment(&[Negative, Positive, Positive, Negative]),
            Some(Neutral)
        );
    }

    #[test]
    fn empty_has_no_verdict() {
        assert_eq!(overall_sentiment(&[]), None);
    }

    #[test]
    fn empty_percentages_are_zero() {
        let pct = sentiment_percentage(&[]);
        assert_eq!(pct.positive_percentage, 0.0);
        assert_eq!(pct.negative_percentage, 0.0);
    }

    #[test]
    fn percentages_round_to_two_places() {
        let pct = sentiment_percentage(&[Positive, Positive, Negative]);
        assert_eq!(pct.positive_percentage, 66.67);
        assert_eq!(pct.negative_percentage, 33.33);

        let pct = sentiment_percentage(&[Positive, Negative, Negative, Negative, Negative, Negative]);
        assert_eq!(pct.positive_percentage, 16.67);
        assert_eq!(pct.negative_percentage, 83.33);
    }

    #[test]
    fn neutral_labels_count_toward_neither_side() {
        let pct = sentiment_percentage(&[Positive, Neutral, Negative, Neutral]);
        assert_eq!(pct.positive_percentage, 25.0);
        assert_eq!(pct.negative_percentage, 25.0);
    }

    #[test]
    fn percentages_consistent_over_random_sequences() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..100 {
            let len = rng.gen_range(1..=30);
            let labels: Vec<SentimentLabel> = (0..len)
                .map(|_| if rng.gen_bool(0.5) { Positive } else { Negative })
                .collect();

            let pct = sentiment_percentage(&labels);
            let positive = labels.iter().filter(|l| **l == Positive).count() as f64;
            let expected = (positive / len as f64 * 100.0 * 100.0).round() / 100.0;
            assert_eq!(pct.positive_percentage, expected);

            let sum = pct.positive_percentage + pct.negative_percentage;
            assert!(
                (sum - 100.0).abs() <= 0.010_001,
                "binary labels should sum to 100, got {sum} for {labels:?}"
            );

            let verdict = overall_sentiment(&labels).unwrap();
            match pct.positive_percentage.partial_cmp(&pct.negative_percentage) {
                Some(std::cmp::Ordering::Greater) => assert_eq!(verdict, Positive),
                Some(std::cmp::Ordering::Less) => assert_eq!(verdict, Negative),
                _ => assert_eq!(verdict, Neutral),
            }
        }
    }

    #[test]
    fn three_way_sums_below_hundred_with_neutral() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let len = rng.gen_range(1..=30);
            let labels: Vec<SentimentLabel> = (0..len)
                .map(|_| match rng.gen_range(0..3) {
                    0 => Positive,
                    1 => Negative,
                    _ => Neutral,
                })
                .collect();
            let pct = sentiment_percentage(&labels);
            let sum = pct.positive_percentage + pct.negative_percentage;
            assert!(sum <= 100.0 + 0.010_001);
            if labels.contains(&Neutral) {
                assert!(sum < 100.0, "{labels:?} -> {sum}");
            }
        }
    }
}
