//! # Reward Core
//!
//! Shared data model for the contributor reward engine. Everything in this crate is a plain value
//! type: addresses, on-chain events, off-chain contribution snapshots, score breakdowns and
//! distribution outcomes. No I/O happens here.

/// Case-insensitive blockchain addresses.
pub mod address;

/// On-chain token events and the kinds they come in.
pub mod chain;

/// Off-chain contribution snapshots, quality metrics, scoring weights and score breakdowns.
pub mod contribution;

/// Outcomes of reward distribution requests.
pub mod distribution;

pub use address::{Address, AddressError};
pub use chain::{ActivityTimeline, ChainEvent, ChainEventData, EventKind, UnknownEventKind};
pub use contribution::{
    ContributionRecord,
    QualityMetrics,
    ScoreBreakdown,
    ScoreMultipliers,
    ScoreWeights,
};
pub use distribution::{DistributionOutcome, DistributionStatus};
