//! # Reward Node
//!
//! Connects the reward engine to the outside world: GitHub for contribution data, an Ethereum
//! RPC node for TEA token events and chain height, and the operator wallet for payouts.
//!
//! ## Modules
//! - [`github`]: `OffChainStatsProvider` over the GitHub REST API.
//! - [`chain_source`]: Token log polling into the event bus, plus the chain head provider.
//! - [`distributor`]: `DistributionProvider` sending ERC-20 transfers.
//! - [`staking`]: Project stake lookups.
//! - [`token`]: Contract bindings and wei conversions.

/// The `chain_source` module turns TEA token logs into engine events.
pub mod chain_source;

/// Token payouts from the operator wallet.
pub mod distributor;

/// Error handling module.
///
/// Defines the `snafu` error type shared by every integration in this crate.
pub mod error;

/// GitHub contribution statistics.
pub mod github;

/// Reads the stake backing a project.
pub mod staking;

/// The TEA token and staking contracts built with sol apis.
pub mod token;
