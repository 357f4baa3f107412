use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Terminal state of a distribution request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DistributionStatus {
    /// The provider accepted the transfer.
    Succeeded {
        /// Provider-issued transaction id.
        transaction_id: String,
    },
    /// The transfer did not happen.
    Failed {
        /// Why, as reported by the provider or the coordinator.
        reason: String,
    },
}

/// What happened to one reward payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionOutcome {
    /// Who the tokens were meant for.
    pub recipient: Address,
    /// Amount in token units.
    pub token_amount: BigDecimal,
    /// Success with a transaction id, or failure with a reason.
    #[serde(flatten)]
    pub status: DistributionStatus,
}

impl DistributionOutcome {
    /// Returns `true` if the provider accepted the transfer.
    pub fn is_success(&self) -> bool {
        matches!(self.status, DistributionStatus::Succeeded { .. })
    }

    /// The transaction id, if the distribution succeeded.
    pub fn transaction_id(&self) -> Option<&str> {
        match &self.status {
            DistributionStatus::Succeeded { transaction_id } => Some(transaction_id),
            DistributionStatus::Failed { .. } => None,
        }
    }

    /// The failure reason, if the distribution failed.
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.status {
            DistributionStatus::Succeeded { .. } => None,
            DistributionStatus::Failed { reason } => Some(reason),
        }
    }
}
