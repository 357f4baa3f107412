use core::fmt;
use core::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use snafu::Snafu;

use crate::address::Address;

/// The kinds of token events the engine tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    /// ERC-20 transfer between two accounts.
    Transfer,
    /// Tokens locked by a user.
    Stake,
    /// Tokens released back to a user.
    Unstake,
    /// Reward paid out to a contributor.
    RewardDistributed,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 4] = [
        EventKind::Transfer,
        EventKind::Stake,
        EventKind::Unstake,
        EventKind::RewardDistributed,
    ];

    /// The event name, as used on the event bus and in the token contract ABI.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Transfer => "Transfer",
            EventKind::Stake => "Stake",
            EventKind::Unstake => "Unstake",
            EventKind::RewardDistributed => "RewardDistributed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an event name is not one of the tracked kinds.
#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(display("unknown chain event kind '{name}'"))]
pub struct UnknownEventKind {
    /// The rejected name.
    pub name: String,
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind {
                name: s.to_string(),
            })
    }
}

/// The participants of a chain event, by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ChainEventData {
    /// `Transfer(from, to, value)`
    Transfer {
        /// Sender.
        from: Address,
        /// Receiver.
        to: Address,
    },
    /// `Stake(user, amount)`
    Stake {
        /// Staking account.
        user: Address,
    },
    /// `Unstake(user, amount)`
    Unstake {
        /// Unstaking account.
        user: Address,
    },
    /// `RewardDistributed(to, amount)`
    RewardDistributed {
        /// Reward recipient.
        to: Address,
    },
}

/// A token event observed on chain. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEvent {
    /// Kind-specific participants.
    #[serde(flatten)]
    pub data: ChainEventData,
    /// Amount in token units (already scaled down from wei).
    pub amount: BigDecimal,
    /// Opaque transaction identifier, usually the transaction hash.
    pub transaction_id: String,
    /// Block the event was included in.
    pub block_number: u64,
}

impl ChainEvent {
    /// Builds a `Transfer` event.
    pub fn transfer(
        from: impl Into<Address>,
        to: impl Into<Address>,
        amount: BigDecimal,
        transaction_id: impl Into<String>,
        block_number: u64,
    ) -> Self {
        Self {
            data: ChainEventData::Transfer {
                from: from.into(),
                to: to.into(),
            },
            amount,
            transaction_id: transaction_id.into(),
            block_number,
        }
    }

    /// Builds a `Stake` event.
    pub fn stake(
        user: impl Into<Address>,
        amount: BigDecimal,
        transaction_id: impl Into<String>,
        block_number: u64,
    ) -> Self {
        Self {
            data: ChainEventData::Stake { user: user.into() },
            amount,
            transaction_id: transaction_id.into(),
            block_number,
        }
    }

    /// Builds an `Unstake` event.
    pub fn unstake(
        user: impl Into<Address>,
        amount: BigDecimal,
        transaction_id: impl Into<String>,
        block_number: u64,
    ) -> Self {
        Self {
            data: ChainEventData::Unstake { user: user.into() },
            amount,
            transaction_id: transaction_id.into(),
            block_number,
        }
    }

    /// Builds a `RewardDistributed` event.
    pub fn reward_distributed(
        to: impl Into<Address>,
        amount: BigDecimal,
        transaction_id: impl Into<String>,
        block_number: u64,
    ) -> Self {
        Self {
            data: ChainEventData::RewardDistributed { to: to.into() },
            amount,
            transaction_id: transaction_id.into(),
            block_number,
        }
    }

    /// The kind of this event.
    pub fn kind(&self) -> EventKind {
        match self.data {
            ChainEventData::Transfer { .. } => EventKind::Transfer,
            ChainEventData::Stake { .. } => EventKind::Stake,
            ChainEventData::Unstake { .. } => EventKind::Unstake,
            ChainEventData::RewardDistributed { .. } => EventKind::RewardDistributed,
        }
    }

    /// Returns `true` if `address` takes part in this event.
    ///
    /// Transfers match on either side, stakes and unstakes on the user, reward distributions on
    /// the recipient.
    pub fn involves(&self, address: &Address) -> bool {
        match &self.data {
            ChainEventData::Transfer { from, to } => from == address || to == address,
            ChainEventData::Stake { user } | ChainEventData::Unstake { user } => user == address,
            ChainEventData::RewardDistributed { to } => to == address,
        }
    }
}

/// Chain activity for one address, most recent block first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTimeline {
    /// The address the timeline was built for.
    pub address: Address,
    /// Lowest block included in the window.
    pub from_block: u64,
    /// Highest block included in the window.
    pub to_block: u64,
    /// Matching events, sorted by block number descending.
    pub events: Vec<ChainEvent>,
}

impl ActivityTimeline {
    /// Number of events in the timeline.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing happened in the window.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sum of the amounts of every event of `kind` in the timeline.
    pub fn total_amount(&self, kind: EventKind) -> BigDecimal {
        self.events
            .iter()
            .filter(|event| event.kind() == kind)
            .map(|event| &event.amount)
            .sum()
    }
}
