//! # Contribution Scorer
//!
//! Pure scoring of off-chain contribution counts. Every input is validated up front; the result
//! depends only on the arguments, so the same inputs always reproduce the same breakdown.
//!
//! ```text
//! total = round((commits * w.commit + issues * w.issue + prs * w.pull_request)
//!               * quality_multiplier * impact_multiplier)
//! ```

use reward_core::{
    ContributionRecord,
    QualityMetrics,
    ScoreBreakdown,
    ScoreMultipliers,
    ScoreWeights,
};

use crate::error::ValidationError;

/// Merge-rate tiers as `(exclusive lower bound, bonus)`, checked highest first.
const MERGE_RATE_BONUSES: [(f64, f64); 2] = [(0.8, 0.2), (0.6, 0.1)];

/// Review-engagement tiers as `(exclusive lower bound, bonus)`, checked highest first.
const REVIEW_BONUSES: [(f64, f64); 2] = [(5.0, 0.2), (2.0, 0.1)];

/// Scores `record` with the given weights and multipliers.
pub fn score(
    record: &ContributionRecord,
    metrics: &QualityMetrics,
    weights: &ScoreWeights,
    multipliers: &ScoreMultipliers,
) -> Result<ScoreBreakdown, ValidationError> {
    validate_weights(weights)?;
    validate_multipliers(multipliers)?;
    validate_record(record)?;
    validate_metrics(metrics)?;

    let commit_score = record.commit_count as f64 * weights.commit;
    let issue_score = record.issue_count as f64 * weights.issue;
    let pr_score = record.pull_request_count as f64 * weights.pull_request;
    let quality_multiplier = quality_multiplier(metrics);
    let impact_multiplier = multipliers.impact;

    let mut breakdown = ScoreBreakdown {
        commit_score,
        issue_score,
        pr_score,
        quality_multiplier,
        impact_multiplier,
        total_score: 0,
    };
    let total = breakdown.base_score() * quality_multiplier * impact_multiplier;
    breakdown.total_score = total.round() as u64;

    Ok(breakdown)
}

/// `1.0` plus the merge-rate bonus plus the review-engagement bonus. Always in `[1.0, 1.4]`.
pub fn quality_multiplier(metrics: &QualityMetrics) -> f64 {
    1.0 + tier_bonus(&MERGE_RATE_BONUSES, metrics.merge_rate)
        + tier_bonus(&REVIEW_BONUSES, metrics.average_review_comments)
}

fn tier_bonus(tiers: &[(f64, f64)], value: f64) -> f64 {
    tiers
        .iter()
        .find(|(threshold, _)| value > *threshold)
        .map_or(0.0, |(_, bonus)| *bonus)
}

fn positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Rejects zero, negative and non-finite weights.
pub fn validate_weights(weights: &ScoreWeights) -> Result<(), ValidationError> {
    for (field, value) in [
        ("commit", weights.commit),
        ("issue", weights.issue),
        ("pull_request", weights.pull_request),
    ] {
        if !positive_finite(value) {
            return Err(ValidationError::InvalidWeight { field, value });
        }
    }
    Ok(())
}

/// Rejects a zero, negative or non-finite impact multiplier.
pub fn validate_multipliers(multipliers: &ScoreMultipliers) -> Result<(), ValidationError> {
    if !positive_finite(multipliers.impact) {
        return Err(ValidationError::InvalidImpactMultiplier {
            value: multipliers.impact,
        });
    }
    Ok(())
}

/// Rejects records covering an empty window.
pub fn validate_record(record: &ContributionRecord) -> Result<(), ValidationError> {
    if record.window_days == 0 {
        return Err(ValidationError::ZeroWindow {
            identifier: record.identifier.clone(),
        });
    }
    Ok(())
}

/// Checks the invariants of [`QualityMetrics`] for values that did not come from
/// [`QualityMetrics::from_counts`].
pub fn validate_metrics(metrics: &QualityMetrics) -> Result<(), ValidationError> {
    if metrics.merged_prs > metrics.total_prs {
        return Err(ValidationError::MergedExceedsTotal {
            merged: metrics.merged_prs,
            total: metrics.total_prs,
        });
    }
    if !(0.0..=1.0).contains(&metrics.merge_rate) {
        return Err(ValidationError::MergeRateOutOfRange {
            value: metrics.merge_rate,
        });
    }
    if !metrics.average_review_comments.is_finite() || metrics.average_review_comments < 0.0 {
        return Err(ValidationError::InvalidReviewAverage {
            value: metrics.average_review_comments,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(commits: u64, issues: u64, prs: u64) -> ContributionRecord {
        ContributionRecord {
            identifier: "octocat".to_string(),
            commit_count: commits,
            issue_count: issues,
            pull_request_count: prs,
            window_days: 30,
        }
    }

    fn metrics(merge_rate: f64, average_review_comments: f64) -> QualityMetrics {
        QualityMetrics {
            total_prs: 10,
            merged_prs: (merge_rate * 10.0).round() as u64,
            merge_rate,
            average_review_comments,
        }
    }

    const NEUTRAL: ScoreMultipliers = ScoreMultipliers { impact: 1.0 };

    #[test]
    fn we_can_score_the_reference_contributor() {
        let weights = ScoreWeights {
            commit: 10.0,
            issue: 5.0,
            pull_request: 15.0,
        };
        let breakdown = score(
            &record(5, 3, 2),
            &metrics(0.85, 6.0),
            &weights,
            &ScoreMultipliers { impact: 1.1 },
        )
        .unwrap();

        assert_eq!(breakdown.commit_score, 50.0);
        assert_eq!(breakdown.issue_score, 15.0);
        assert_eq!(breakdown.pr_score, 30.0);
        assert!((breakdown.quality_multiplier - 1.4).abs() < 1e-12);
        assert_eq!(breakdown.impact_multiplier, 1.1);
        assert_eq!(breakdown.total_score, 146);
    }

    #[test]
    fn we_can_score_the_rounded_weighted_sum_with_neutral_multipliers() {
        let weights = ScoreWeights {
            commit: 1.25,
            issue: 0.5,
            pull_request: 3.3,
        };
        let no_quality = QualityMetrics::default();

        for (c, i, p) in [(0, 0, 0), (1, 1, 1), (7, 0, 3), (13, 21, 34), (1000, 3, 999)] {
            let breakdown = score(&record(c, i, p), &no_quality, &weights, &NEUTRAL).unwrap();
            let expected = (c as f64 * 1.25 + i as f64 * 0.5 + p as f64 * 3.3).round() as u64;

            assert_eq!(breakdown.quality_multiplier, 1.0);
            assert_eq!(breakdown.base_score().round() as u64, expected);
            assert_eq!(breakdown.total_score, expected, "counts {c}/{i}/{p}");
        }
    }

    #[test]
    fn we_can_score_zero_counts_and_still_report_quality() {
        let breakdown = score(
            &record(0, 0, 0),
            &metrics(0.9, 3.0),
            &ScoreWeights::default(),
            &ScoreMultipliers::default(),
        )
        .unwrap();

        assert_eq!(breakdown.total_score, 0);
        assert!((breakdown.quality_multiplier - 1.3).abs() < 1e-12);
    }

    #[test]
    fn we_can_bound_the_quality_multiplier_monotonically() {
        let steps: Vec<f64> = (0..=100).map(|step| step as f64 / 100.0).collect();

        let mut previous = 0.0;
        for &rate in &steps {
            let value = quality_multiplier(&metrics(rate, 0.0));
            assert!(value >= previous);
            assert!((1.0..=1.4).contains(&value));
            previous = value;
        }

        let mut previous = 0.0;
        for reviews in (0..=200).map(|step| step as f64 / 20.0) {
            let value = quality_multiplier(&metrics(1.0, reviews));
            assert!(value >= previous);
            assert!(value <= 1.4 + 1e-12);
            previous = value;
        }
    }

    #[test]
    fn we_can_apply_strict_quality_tier_thresholds() {
        assert_eq!(quality_multiplier(&metrics(0.6, 2.0)), 1.0);
        assert!((quality_multiplier(&metrics(0.61, 0.0)) - 1.1).abs() < 1e-12);
        assert!((quality_multiplier(&metrics(0.8, 0.0)) - 1.1).abs() < 1e-12);
        assert!((quality_multiplier(&metrics(0.0, 2.5)) - 1.1).abs() < 1e-12);
        assert!((quality_multiplier(&metrics(0.0, 5.0)) - 1.1).abs() < 1e-12);
        assert!((quality_multiplier(&metrics(0.0, 5.5)) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn we_cannot_score_with_invalid_weights_or_multipliers() {
        let weights = ScoreWeights {
            issue: 0.0,
            ..ScoreWeights::default()
        };
        assert_eq!(
            score(&record(1, 1, 1), &QualityMetrics::default(), &weights, &NEUTRAL),
            Err(ValidationError::InvalidWeight {
                field: "issue",
                value: 0.0
            })
        );

        let result = score(
            &record(1, 1, 1),
            &QualityMetrics::default(),
            &ScoreWeights::default(),
            &ScoreMultipliers { impact: f64::NAN },
        );
        assert!(matches!(
            result,
            Err(ValidationError::InvalidImpactMultiplier { .. })
        ));
    }

    #[test]
    fn we_cannot_score_inconsistent_metrics_or_empty_windows() {
        let bad_merges = QualityMetrics {
            total_prs: 1,
            merged_prs: 2,
            merge_rate: 1.0,
            average_review_comments: 0.0,
        };
        let bad_rate = QualityMetrics {
            merge_rate: 1.5,
            ..QualityMetrics::from_counts(2, 2, 0)
        };
        let bad_reviews = QualityMetrics {
            average_review_comments: -1.0,
            ..QualityMetrics::default()
        };
        let weights = ScoreWeights::default();

        assert!(matches!(
            score(&record(1, 0, 0), &bad_merges, &weights, &NEUTRAL),
            Err(ValidationError::MergedExceedsTotal { merged: 2, total: 1 })
        ));
        assert!(matches!(
            score(&record(1, 0, 0), &bad_rate, &weights, &NEUTRAL),
            Err(ValidationError::MergeRateOutOfRange { .. })
        ));
        assert!(matches!(
            score(&record(1, 0, 0), &bad_reviews, &weights, &NEUTRAL),
            Err(ValidationError::InvalidReviewAverage { .. })
        ));

        let empty_window = ContributionRecord {
            window_days: 0,
            ..record(1, 0, 0)
        };
        assert!(matches!(
            score(&empty_window, &QualityMetrics::default(), &weights, &NEUTRAL),
            Err(ValidationError::ZeroWindow { .. })
        ));
    }

    #[test]
    fn we_can_reproduce_a_score() {
        let inputs = (record(4, 9, 2), metrics(0.7, 4.0));
        let first = score(&inputs.0, &inputs.1, &ScoreWeights::default(), &NEUTRAL).unwrap();
        let second = score(&inputs.0, &inputs.1, &ScoreWeights::default(), &NEUTRAL).unwrap();
        assert_eq!(first, second);
    }
}
