//! Narrow interfaces to the engine's external collaborators.
//!
//! Implementations (GitHub clients, RPC providers, wallets) live outside the engine. Errors are
//! returned boxed and surfaced to the caller with the originating cause attached. Timeouts are
//! the implementation's concern and should come back as ordinary errors.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use reward_core::{Address, ContributionRecord, QualityMetrics};

use crate::error::BoxError;

/// Supplies off-chain contribution data.
#[async_trait]
pub trait OffChainStatsProvider: Send + Sync {
    /// Activity counts for `identifier` over the trailing `window_days`.
    async fn contribution_record(
        &self,
        identifier: &str,
        window_days: u32,
    ) -> Result<ContributionRecord, BoxError>;

    /// Review-quality metrics for `identifier`.
    async fn quality_metrics(&self, identifier: &str) -> Result<QualityMetrics, BoxError>;
}

/// Sends reward tokens.
///
/// The engine never deduplicates submissions, so implementations must be safe to retry from
/// the outside.
#[async_trait]
pub trait DistributionProvider: Send + Sync {
    /// Transfers `amount` token units to `recipient` and returns the transaction id.
    async fn distribute(&self, recipient: &Address, amount: &BigDecimal) -> Result<String, BoxError>;
}

/// Reports the current chain height.
#[async_trait]
pub trait ChainHeadProvider: Send + Sync {
    /// Latest block number.
    async fn current_block(&self) -> Result<u64, BoxError>;
}

/// Counts the reviews left on one pull request.
#[async_trait]
pub trait ReviewCountSource: Send + Sync {
    /// Number of reviews on pull request `number`.
    async fn review_count(&self, number: u64) -> Result<u64, BoxError>;
}
