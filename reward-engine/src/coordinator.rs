//! # Reward Coordinator
//!
//! Ties scoring, token conversion, distribution and history together.
//!
//! ## Distribution lifecycle
//! ```text
//! Scored -> Converting -> Submitting -> Succeeded
//!               |              \-----> Failed
//!               \-> Failed (nothing to distribute)
//! ```
//! Outcomes are returned as [`DistributionOutcome`] values and never as errors, so a batch keeps
//! going when one recipient fails. Failed requests are not retried.
//!
//! A successful distribution does not touch the [`ActivityLedger`]; the authoritative chain
//! event reaches the ledger through the chain event source once the transfer is on chain.

use std::fmt;
use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};
use log::{debug, info, warn};
use num_bigint::BigInt;
use reward_core::{
    ActivityTimeline,
    Address,
    ContributionRecord,
    DistributionOutcome,
    DistributionStatus,
    QualityMetrics,
    ScoreBreakdown,
};
use serde::Serialize;
use snafu::{ResultExt, Snafu};

use crate::activity_ledger::ActivityLedger;
use crate::config::ScoringConfig;
use crate::error::{
    ChainHeadSnafu,
    CoordinatorError,
    OffChainSnafu,
    ProviderError,
    Result,
    ValidationError,
};
use crate::observability::{describe_payout, AuditEvent, ObservabilitySink};
use crate::providers::{ChainHeadProvider, DistributionProvider, OffChainStatsProvider};
use crate::scorer;

/// Score points per whole token.
pub const SCORE_POINTS_PER_TOKEN: u64 = 100;

/// Reason reported when a score converts to zero tokens.
pub const NOTHING_TO_DISTRIBUTE: &str = "nothing to distribute: score converts to zero tokens";

/// Converts a total score into token units: `total_score / 100`, exactly.
pub fn token_amount(total_score: u64) -> BigDecimal {
    // scale 2 == divide by SCORE_POINTS_PER_TOKEN
    BigDecimal::new(BigInt::from(total_score), 2)
}

/// Parses a recipient address supplied by a caller.
pub fn parse_recipient(raw: &str) -> Result<Address, ValidationError> {
    raw.parse::<Address>()
        .map_err(|e| ValidationError::MalformedAddress {
            address: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Where a distribution request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionStage {
    /// A score breakdown exists.
    Scored,
    /// Converting the score into a token amount.
    Converting,
    /// Handed to the distribution provider.
    Submitting,
    /// The provider returned a transaction id.
    Succeeded,
    /// The request ended without a transfer.
    Failed,
}

impl DistributionStage {
    /// Returns `true` if the lifecycle allows moving from `self` to `next`.
    pub fn can_advance_to(self, next: DistributionStage) -> bool {
        use DistributionStage::*;
        matches!(
            (self, next),
            (Scored, Converting)
                | (Converting, Submitting)
                | (Converting, Failed)
                | (Submitting, Succeeded)
                | (Submitting, Failed)
        )
    }

    /// Returns `true` for `Succeeded` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, DistributionStage::Succeeded | DistributionStage::Failed)
    }
}

impl fmt::Display for DistributionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tracks one distribution request through its stages.
struct DistributionRequest<'a> {
    recipient: &'a Address,
    stage: DistributionStage,
}

impl<'a> DistributionRequest<'a> {
    fn new(recipient: &'a Address) -> Self {
        Self {
            recipient,
            stage: DistributionStage::Scored,
        }
    }

    fn advance(&mut self, next: DistributionStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal distribution transition {} -> {}",
            self.stage,
            next
        );
        debug!(
            "Distribution to {}: {} -> {}",
            self.recipient, self.stage, next
        );
        self.stage = next;
    }
}

/// Off-chain data and the score derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredContribution {
    /// Activity counts.
    pub record: ContributionRecord,
    /// Quality signals.
    pub metrics: QualityMetrics,
    /// The resulting score.
    pub breakdown: ScoreBreakdown,
}

/// Result of scoring and paying one contributor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardReport {
    /// How the contributor scored.
    pub scored: ScoredContribution,
    /// What happened to the payout.
    pub outcome: DistributionOutcome,
}

/// Which half of a combined history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HistorySide {
    /// GitHub-derived contribution data.
    OffChain,
    /// Ledger activity.
    OnChain,
}

/// Off-chain and on-chain views of one contributor, each with its own result.
#[derive(Debug)]
pub struct ContributorHistory {
    /// Off-chain identifier.
    pub identifier: String,
    /// On-chain address.
    pub address: Address,
    /// Record, metrics and score, or why they could not be fetched.
    pub off_chain: Result<ScoredContribution, CoordinatorError>,
    /// Recent ledger activity, or why it could not be read.
    pub on_chain: Result<ActivityTimeline, ProviderError>,
}

/// A combined history in which at least one side failed.
#[derive(Debug, Snafu)]
pub enum CompositionError {
    /// Off-chain data is missing; the on-chain side is kept.
    #[snafu(display("off-chain history unavailable: {source}"))]
    OffChainFailed {
        /// Why the off-chain side failed.
        source: CoordinatorError,
        /// The successful on-chain side.
        on_chain: ActivityTimeline,
    },

    /// On-chain activity is missing; the off-chain side is kept.
    #[snafu(display("on-chain history unavailable: {source}"))]
    OnChainFailed {
        /// Why the on-chain side failed.
        source: ProviderError,
        /// The successful off-chain side.
        off_chain: ScoredContribution,
    },

    /// Neither side could be produced.
    #[snafu(display("history unavailable: off-chain: {source}; on-chain: {on_chain}"))]
    BothFailed {
        /// Off-chain failure.
        source: CoordinatorError,
        /// On-chain failure.
        on_chain: ProviderError,
    },
}

impl ContributorHistory {
    /// The side that failed, if exactly one did; `None` when both succeeded or both failed.
    pub fn failed_side(&self) -> Option<HistorySide> {
        match (&self.off_chain, &self.on_chain) {
            (Err(_), Ok(_)) => Some(HistorySide::OffChain),
            (Ok(_), Err(_)) => Some(HistorySide::OnChain),
            _ => None,
        }
    }

    /// Returns `true` if both sides succeeded.
    pub fn is_complete(&self) -> bool {
        self.off_chain.is_ok() && self.on_chain.is_ok()
    }

    /// Both sides, or a [`CompositionError`] naming the failure and carrying whatever succeeded.
    pub fn into_complete(
        self,
    ) -> Result<(ScoredContribution, ActivityTimeline), CompositionError> {
        match (self.off_chain, self.on_chain) {
            (Ok(off_chain), Ok(on_chain)) => Ok((off_chain, on_chain)),
            (Err(source), Ok(on_chain)) => {
                Err(CompositionError::OffChainFailed { source, on_chain })
            }
            (Ok(off_chain), Err(source)) => {
                Err(CompositionError::OnChainFailed { source, off_chain })
            }
            (Err(source), Err(on_chain)) => Err(CompositionError::BothFailed { source, on_chain }),
        }
    }
}

/// Orchestrates scoring, distribution and history over injected collaborators.
pub struct RewardCoordinator {
    config: ScoringConfig,
    stats: Arc<dyn OffChainStatsProvider>,
    distributor: Arc<dyn DistributionProvider>,
    ledger: Arc<ActivityLedger>,
    chain_head: Option<Arc<dyn ChainHeadProvider>>,
    sink: Arc<dyn ObservabilitySink>,
}

impl RewardCoordinator {
    /// Creates a coordinator. `config` is validated here so later scoring cannot fail on it.
    pub fn new(
        config: ScoringConfig,
        stats: Arc<dyn OffChainStatsProvider>,
        distributor: Arc<dyn DistributionProvider>,
        ledger: Arc<ActivityLedger>,
        sink: Arc<dyn ObservabilitySink>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            config: config.validated()?,
            stats,
            distributor,
            ledger,
            chain_head: None,
            sink,
        })
    }

    /// Refreshes the ledger's chain head from `chain_head` before every history query.
    pub fn with_chain_head(mut self, chain_head: Arc<dyn ChainHeadProvider>) -> Self {
        self.chain_head = Some(chain_head);
        self
    }

    /// Fetches record and metrics for `identifier` concurrently and scores them.
    pub async fn score_contributor(&self, identifier: &str) -> Result<ScoredContribution> {
        let record = async {
            self.stats
                .contribution_record(identifier, self.config.window_days)
                .await
                .context(OffChainSnafu {
                    what: "contribution record",
                    identifier,
                })
        };
        let metrics = async {
            self.stats
                .quality_metrics(identifier)
                .await
                .context(OffChainSnafu {
                    what: "quality metrics",
                    identifier,
                })
        };
        let (record, metrics) = tokio::try_join!(record, metrics)?;

        let breakdown = scorer::score(
            &record,
            &metrics,
            &self.config.weights,
            &self.config.multipliers,
        )?;

        info!(
            "Scored {}: {} points ({} commits, {} issues, {} pull requests)",
            identifier,
            breakdown.total_score,
            record.commit_count,
            record.issue_count,
            record.pull_request_count
        );
        self.sink.emit(AuditEvent::ScoreComputed {
            contributor: identifier.to_string(),
            breakdown: breakdown.clone(),
        });

        Ok(ScoredContribution {
            record,
            metrics,
            breakdown,
        })
    }

    /// Converts `breakdown` into tokens and hands them to the distribution provider.
    pub async fn distribute(
        &self,
        recipient: &Address,
        breakdown: &ScoreBreakdown,
    ) -> DistributionOutcome {
        let mut request = DistributionRequest::new(recipient);

        request.advance(DistributionStage::Converting);
        let amount = token_amount(breakdown.total_score);

        let status = if amount.is_zero() {
            request.advance(DistributionStage::Failed);
            DistributionStatus::Failed {
                reason: NOTHING_TO_DISTRIBUTE.to_string(),
            }
        } else {
            request.advance(DistributionStage::Submitting);
            match self.distributor.distribute(recipient, &amount).await {
                Ok(transaction_id) => {
                    request.advance(DistributionStage::Succeeded);
                    info!(
                        "Distributed {} in transaction {}",
                        describe_payout(recipient, &amount),
                        transaction_id
                    );
                    DistributionStatus::Succeeded { transaction_id }
                }
                Err(e) => {
                    request.advance(DistributionStage::Failed);
                    warn!(
                        "Failed to distribute {}: {}",
                        describe_payout(recipient, &amount),
                        e
                    );
                    DistributionStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            }
        };
        debug_assert!(request.stage.is_terminal());

        let outcome = DistributionOutcome {
            recipient: recipient.clone(),
            token_amount: amount,
            status,
        };
        self.sink.emit(AuditEvent::DistributionCompleted {
            outcome: outcome.clone(),
        });
        outcome
    }

    /// Distributes to every recipient in order, continuing past failures.
    pub async fn distribute_batch(
        &self,
        requests: &[(Address, ScoreBreakdown)],
    ) -> Vec<DistributionOutcome> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for (recipient, breakdown) in requests {
            outcomes.push(self.distribute(recipient, breakdown).await);
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        info!(
            "Batch distribution finished: {} succeeded, {} failed",
            succeeded,
            outcomes.len() - succeeded
        );
        outcomes
    }

    /// Scores `identifier` and pays the result to `recipient`.
    pub async fn reward_contributor(
        &self,
        identifier: &str,
        recipient: &Address,
    ) -> Result<RewardReport> {
        let scored = self.score_contributor(identifier).await?;
        let outcome = self.distribute(recipient, &scored.breakdown).await;
        Ok(RewardReport { scored, outcome })
    }

    /// Fetches both halves of a contributor's history concurrently.
    ///
    /// Neither side waits for the other, and a failure on one side does not discard the other.
    pub async fn contributor_history(
        &self,
        identifier: &str,
        address: &Address,
    ) -> ContributorHistory {
        let (off_chain, on_chain) = tokio::join!(
            self.score_contributor(identifier),
            self.on_chain_activity(address)
        );

        if let Err(e) = &off_chain {
            warn!("Off-chain history for {} failed: {}", identifier, e);
        }
        if let Err(e) = &on_chain {
            warn!("On-chain history for {} failed: {}", address, e);
        }

        ContributorHistory {
            identifier: identifier.to_string(),
            address: address.clone(),
            off_chain,
            on_chain,
        }
    }

    async fn on_chain_activity(
        &self,
        address: &Address,
    ) -> Result<ActivityTimeline, ProviderError> {
        if let Some(chain_head) = &self.chain_head {
            let block = chain_head.current_block().await.context(ChainHeadSnafu)?;
            self.ledger.advance_head(block);
        }
        Ok(self
            .ledger
            .recent_activity(address, self.config.block_window))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use reward_core::ChainEvent;

    use super::*;
    use crate::error::BoxError;
    use crate::observability::MemorySink;

    struct FakeStats {
        fail: bool,
    }

    #[async_trait]
    impl OffChainStatsProvider for FakeStats {
        async fn contribution_record(
            &self,
            identifier: &str,
            window_days: u32,
        ) -> Result<ContributionRecord, BoxError> {
            if self.fail {
                return Err("github unreachable".into());
            }
            Ok(ContributionRecord {
                identifier: identifier.to_string(),
                commit_count: 5,
                issue_count: 3,
                pull_request_count: 2,
                window_days,
            })
        }

        async fn quality_metrics(&self, _identifier: &str) -> Result<QualityMetrics, BoxError> {
            Ok(QualityMetrics::from_counts(20, 17, 120))
        }
    }

    #[derive(Default)]
    struct FakeDistributor {
        reject: Vec<Address>,
        calls: Mutex<Vec<(Address, BigDecimal)>>,
    }

    #[async_trait]
    impl DistributionProvider for FakeDistributor {
        async fn distribute(
            &self,
            recipient: &Address,
            amount: &BigDecimal,
        ) -> Result<String, BoxError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((recipient.clone(), amount.clone()));
            if self.reject.contains(recipient) {
                return Err("insufficient allowance".into());
            }
            Ok(format!("0xtx{}", calls.len()))
        }
    }

    struct FakeHead(Option<u64>);

    #[async_trait]
    impl ChainHeadProvider for FakeHead {
        async fn current_block(&self) -> Result<u64, BoxError> {
            self.0.ok_or_else(|| "rpc timeout".into())
        }
    }

    struct Harness {
        coordinator: RewardCoordinator,
        distributor: Arc<FakeDistributor>,
        ledger: Arc<ActivityLedger>,
        sink: Arc<MemorySink>,
    }

    fn harness(stats_fail: bool, distributor: FakeDistributor) -> Harness {
        let sink = Arc::new(MemorySink::new());
        let ledger = Arc::new(ActivityLedger::new(sink.clone()));
        let distributor = Arc::new(distributor);
        let coordinator = RewardCoordinator::new(
            ScoringConfig::default(),
            Arc::new(FakeStats { fail: stats_fail }),
            distributor.clone(),
            ledger.clone(),
            sink.clone(),
        )
        .unwrap();

        Harness {
            coordinator,
            distributor,
            ledger,
            sink,
        }
    }

    fn breakdown(total_score: u64) -> ScoreBreakdown {
        ScoreBreakdown {
            commit_score: total_score as f64,
            issue_score: 0.0,
            pr_score: 0.0,
            quality_multiplier: 1.0,
            impact_multiplier: 1.0,
            total_score,
        }
    }

    fn decimal(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn we_can_convert_scores_to_exact_token_amounts() {
        assert_eq!(token_amount(146), decimal("1.46"));
        assert_eq!(token_amount(5), decimal("0.05"));
        assert_eq!(token_amount(1_000), decimal("10"));
        assert!(token_amount(0).is_zero());
    }

    #[test]
    fn we_cannot_make_undocumented_stage_transitions() {
        use DistributionStage::*;
        assert!(Scored.can_advance_to(Converting));
        assert!(Converting.can_advance_to(Failed));
        assert!(!Scored.can_advance_to(Submitting));
        assert!(!Succeeded.can_advance_to(Failed));
        assert!(!Failed.can_advance_to(Submitting));
    }

    #[test]
    fn we_cannot_parse_a_blank_recipient() {
        assert!(matches!(
            parse_recipient(" "),
            Err(ValidationError::MalformedAddress { .. })
        ));
        assert_eq!(parse_recipient("0xAbC").unwrap(), Address::new("0xabc"));
    }

    #[tokio::test]
    async fn we_can_score_a_contributor_from_the_stats_provider() {
        let h = harness(false, FakeDistributor::default());

        let scored = h.coordinator.score_contributor("octocat").await.unwrap();

        assert_eq!(scored.record.window_days, 30);
        assert_eq!(scored.metrics.merge_rate, 0.85);
        assert_eq!(scored.breakdown.total_score, 146);
        assert!(matches!(
            h.sink.events().as_slice(),
            [AuditEvent::ScoreComputed { contributor, .. }] if contributor == "octocat"
        ));
    }

    #[tokio::test]
    async fn we_can_see_the_cause_of_provider_failures() {
        let h = harness(true, FakeDistributor::default());

        let error = h.coordinator.score_contributor("octocat").await.unwrap_err();

        match error {
            CoordinatorError::Provider {
                source: ProviderError::OffChain { what, source, .. },
            } => {
                assert_eq!(what, "contribution record");
                assert_eq!(source.to_string(), "github unreachable");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(h.sink.records().is_empty());
    }

    #[tokio::test]
    async fn we_can_get_the_transaction_id_of_a_successful_distribution() {
        let h = harness(false, FakeDistributor::default());
        let recipient = Address::new("0xBEEF");

        let outcome = h.coordinator.distribute(&recipient, &breakdown(146)).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.transaction_id(), Some("0xtx1"));
        assert_eq!(outcome.token_amount, decimal("1.46"));
        assert_eq!(
            *h.distributor.calls.lock().unwrap(),
            vec![(recipient.clone(), decimal("1.46"))]
        );
        // authoritative-only: nothing lands in the ledger until the chain reports it
        assert!(h.ledger.recent_activity(&recipient, 10_000).is_empty());
        assert!(matches!(
            h.sink.events().last(),
            Some(AuditEvent::DistributionCompleted { outcome }) if outcome.is_success()
        ));
    }

    #[tokio::test]
    async fn we_can_get_a_failed_distribution_as_an_outcome() {
        let recipient = Address::new("0xdead");
        let h = harness(
            false,
            FakeDistributor {
                reject: vec![recipient.clone()],
                ..Default::default()
            },
        );

        let outcome = h.coordinator.distribute(&recipient, &breakdown(300)).await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.failure_reason(), Some("insufficient allowance"));
        assert_eq!(h.distributor.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn we_cannot_send_a_zero_score_to_the_provider() {
        let h = harness(false, FakeDistributor::default());

        let outcome = h
            .coordinator
            .distribute(&Address::new("0xa"), &breakdown(0))
            .await;

        assert_eq!(outcome.failure_reason(), Some(NOTHING_TO_DISTRIBUTE));
        assert!(h.distributor.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn we_can_continue_a_batch_past_failures() {
        let bad = Address::new("0xbad");
        let h = harness(
            false,
            FakeDistributor {
                reject: vec![bad.clone()],
                ..Default::default()
            },
        );
        let requests = vec![
            (Address::new("0x1"), breakdown(100)),
            (bad, breakdown(200)),
            (Address::new("0x3"), breakdown(300)),
        ];

        let outcomes = h.coordinator.distribute_batch(&requests).await;

        let successes: Vec<bool> = outcomes.iter().map(|o| o.is_success()).collect();
        assert_eq!(successes, vec![true, false, true]);
        assert_eq!(outcomes[2].transaction_id(), Some("0xtx3"));
    }

    #[tokio::test]
    async fn we_can_reward_a_contributor_end_to_end() {
        let h = harness(false, FakeDistributor::default());

        let report = h
            .coordinator
            .reward_contributor("octocat", &Address::new("0xBEEF"))
            .await
            .unwrap();

        assert_eq!(report.scored.breakdown.total_score, 146);
        assert_eq!(report.outcome.token_amount, decimal("1.46"));
        assert!(report.outcome.is_success());
    }

    #[tokio::test]
    async fn we_can_combine_both_history_sides_and_refresh_the_head() {
        let h = harness(false, FakeDistributor::default());
        let coordinator = h.coordinator.with_chain_head(Arc::new(FakeHead(Some(20_000))));
        h.ledger.record(ChainEvent::stake("0xa", decimal("1"), "0xold", 5_000));
        h.ledger.record(ChainEvent::stake("0xA", decimal("2"), "0xnew", 15_000));

        let history = coordinator
            .contributor_history("octocat", &Address::new("0xa"))
            .await;

        assert!(history.is_complete());
        let (off_chain, on_chain) = history.into_complete().unwrap();
        assert_eq!(off_chain.breakdown.total_score, 146);
        assert_eq!(on_chain.from_block, 10_000);
        assert_eq!(on_chain.to_block, 20_000);
        assert_eq!(on_chain.len(), 1);
        assert_eq!(on_chain.events[0].transaction_id, "0xnew");
    }

    #[tokio::test]
    async fn we_can_keep_the_on_chain_side_when_off_chain_fails() {
        let h = harness(true, FakeDistributor::default());
        h.ledger.record(ChainEvent::stake("0xa", decimal("1"), "0x1", 1));

        let history = h
            .coordinator
            .contributor_history("octocat", &Address::new("0xa"))
            .await;

        assert_eq!(history.failed_side(), Some(HistorySide::OffChain));
        match history.into_complete() {
            Err(CompositionError::OffChainFailed { on_chain, .. }) => assert_eq!(on_chain.len(), 1),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn we_can_keep_the_off_chain_side_when_the_chain_head_fails() {
        let h = harness(false, FakeDistributor::default());
        let coordinator = h.coordinator.with_chain_head(Arc::new(FakeHead(None)));

        let history = coordinator
            .contributor_history("octocat", &Address::new("0xa"))
            .await;

        assert_eq!(history.failed_side(), Some(HistorySide::OnChain));
        match history.into_complete() {
            Err(CompositionError::OnChainFailed { off_chain, source }) => {
                assert_eq!(off_chain.breakdown.total_score, 146);
                assert!(matches!(source, ProviderError::ChainHead { .. }));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn we_can_see_both_history_failures() {
        let h = harness(true, FakeDistributor::default());
        let coordinator = h.coordinator.with_chain_head(Arc::new(FakeHead(None)));

        let history = coordinator
            .contributor_history("octocat", &Address::new("0xa"))
            .await;

        assert_eq!(history.failed_side(), None);
        assert!(matches!(
            history.into_complete(),
            Err(CompositionError::BothFailed { .. })
        ));
    }

    #[test]
    fn we_cannot_build_a_coordinator_with_invalid_config() {
        let sink: Arc<MemorySink> = Arc::new(MemorySink::new());
        let config = ScoringConfig {
            multipliers: reward_core::ScoreMultipliers { impact: 0.0 },
            ..ScoringConfig::default()
        };

        let result = RewardCoordinator::new(
            config,
            Arc::new(FakeStats { fail: false }),
            Arc::new(FakeDistributor::default()),
            Arc::new(ActivityLedger::new(sink.clone())),
            sink,
        );

        assert!(matches!(
            result,
            Err(ValidationError::InvalidImpactMultiplier { .. })
        ));
    }
}
