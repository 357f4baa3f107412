//! Scoring configuration, loadable from CLI flags or environment variables.

use clap::Args;
use reward_core::{ScoreMultipliers, ScoreWeights};

use crate::error::ValidationError;
use crate::scorer;

/// Default trailing window for off-chain activity, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Default number of blocks considered "recent" for on-chain activity.
pub const DEFAULT_BLOCK_WINDOW: u64 = 10_000;

/// CLI/env arguments controlling how contributors are scored.
#[derive(Debug, Clone, Args)]
pub struct ScoringArgs {
    /// Points per commit.
    #[arg(long, env = "REWARD_COMMIT_WEIGHT", default_value_t = 10.0)]
    pub commit_weight: f64,

    /// Points per issue.
    #[arg(long, env = "REWARD_ISSUE_WEIGHT", default_value_t = 5.0)]
    pub issue_weight: f64,

    /// Points per pull request.
    #[arg(long, env = "REWARD_PULL_REQUEST_WEIGHT", default_value_t = 15.0)]
    pub pull_request_weight: f64,

    /// Project-wide impact multiplier.
    #[arg(long, env = "REWARD_IMPACT_MULTIPLIER", default_value_t = 1.1)]
    pub impact_multiplier: f64,

    /// Trailing window for off-chain activity, in days.
    #[arg(long, env = "REWARD_WINDOW_DAYS", default_value_t = DEFAULT_WINDOW_DAYS)]
    pub window_days: u32,

    /// Number of blocks considered recent for on-chain activity.
    #[arg(long, env = "REWARD_BLOCK_WINDOW", default_value_t = DEFAULT_BLOCK_WINDOW)]
    pub block_window: u64,
}

impl ScoringArgs {
    /// Validates the arguments and turns them into a [`ScoringConfig`].
    pub fn to_config(&self) -> Result<ScoringConfig, ValidationError> {
        ScoringConfig {
            weights: ScoreWeights {
                commit: self.commit_weight,
                issue: self.issue_weight,
                pull_request: self.pull_request_weight,
            },
            multipliers: ScoreMultipliers {
                impact: self.impact_multiplier,
            },
            window_days: self.window_days,
            block_window: self.block_window,
        }
        .validated()
    }
}

/// Validated scoring configuration used by the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Per-contribution weights.
    pub weights: ScoreWeights,
    /// Configured multipliers.
    pub multipliers: ScoreMultipliers,
    /// Off-chain window in days.
    pub window_days: u32,
    /// On-chain window in blocks.
    pub block_window: u64,
}

impl ScoringConfig {
    /// Checks weights, multipliers and window; returns `self` unchanged when valid.
    pub fn validated(self) -> Result<Self, ValidationError> {
        scorer::validate_weights(&self.weights)?;
        scorer::validate_multipliers(&self.multipliers)?;
        if self.window_days == 0 {
            return Err(ValidationError::ZeroWindow {
                identifier: "<config>".to_string(),
            });
        }
        Ok(self)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            multipliers: ScoreMultipliers::default(),
            window_days: DEFAULT_WINDOW_DAYS,
            block_window: DEFAULT_BLOCK_WINDOW,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestParser {
        #[command(flatten)]
        scoring: ScoringArgs,
    }

    #[test]
    fn we_can_map_default_arguments_to_the_default_config() {
        let TestParser { scoring } = TestParser::parse_from(["test"]);

        assert_eq!(scoring.to_config().unwrap(), ScoringConfig::default());
    }

    #[test]
    fn we_can_override_weights_from_flags() {
        let TestParser { scoring } = TestParser::parse_from([
            "test",
            "--commit-weight",
            "2.5",
            "--block-window",
            "42",
        ]);

        let config = scoring.to_config().unwrap();
        assert_eq!(config.weights.commit, 2.5);
        assert_eq!(config.block_window, 42);
    }

    #[test]
    fn we_cannot_configure_a_negative_weight() {
        let TestParser { scoring } =
            TestParser::parse_from(["test", "--pull-request-weight=-1"]);

        assert!(matches!(
            scoring.to_config(),
            Err(ValidationError::InvalidWeight {
                field: "pull_request",
                ..
            })
        ));
    }
}
