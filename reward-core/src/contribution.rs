use serde::{Deserialize, Serialize};

/// Off-chain activity counts for one contributor over a trailing window.
///
/// Produced fresh for every scoring run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecord {
    /// GitHub username (or any other off-chain identifier).
    pub identifier: String,
    /// Commits authored within the window.
    pub commit_count: u64,
    /// Issues opened within the window.
    pub issue_count: u64,
    /// Pull requests opened.
    pub pull_request_count: u64,
    /// Length of the window in days.
    pub window_days: u32,
}

/// Review-quality signals derived from a contributor's closed pull requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Closed pull requests considered.
    pub total_prs: u64,
    /// How many of those were merged.
    pub merged_prs: u64,
    /// `merged_prs / total_prs`, or 0 without pull requests.
    pub merge_rate: f64,
    /// Mean number of reviews per pull request, or 0 without pull requests.
    pub average_review_comments: f64,
}

impl QualityMetrics {
    /// Derives the rates from raw counts.
    pub fn from_counts(total_prs: u64, merged_prs: u64, total_review_comments: u64) -> Self {
        let (merge_rate, average_review_comments) = if total_prs == 0 {
            (0.0, 0.0)
        } else {
            (
                merged_prs as f64 / total_prs as f64,
                total_review_comments as f64 / total_prs as f64,
            )
        };

        Self {
            total_prs,
            merged_prs,
            merge_rate,
            average_review_comments,
        }
    }
}

impl Default for QualityMetrics {
    fn default() -> Self {
        Self::from_counts(0, 0, 0)
    }
}

/// Points awarded per unit of each contribution type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Points per commit.
    pub commit: f64,
    /// Points per issue.
    pub issue: f64,
    /// Points per pull request.
    pub pull_request: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            commit: 10.0,
            issue: 5.0,
            pull_request: 15.0,
        }
    }
}

/// Configured multipliers applied on top of the derived quality multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreMultipliers {
    /// Project-wide impact multiplier.
    pub impact: f64,
}

impl Default for ScoreMultipliers {
    fn default() -> Self {
        Self { impact: 1.1 }
    }
}

/// The result of scoring a contribution record, with every intermediate term kept for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// `commit_count * weights.commit`
    pub commit_score: f64,
    /// `issue_count * weights.issue`
    pub issue_score: f64,
    /// `pull_request_count * weights.pull_request`
    pub pr_score: f64,
    /// Derived from merge rate and review engagement, in `[1.0, 1.4]`.
    pub quality_multiplier: f64,
    /// Configured impact multiplier.
    pub impact_multiplier: f64,
    /// Rounded final score.
    pub total_score: u64,
}

impl ScoreBreakdown {
    /// Sum of the weighted terms before any multiplier.
    pub fn base_score(&self) -> f64 {
        self.commit_score + self.issue_score + self.pr_score
    }
}
