//! # Reward Engine
//!
//! The core of the contributor reward engine: an in-process event bus, an append-only ledger of
//! on-chain token activity, a pure contribution scorer and a coordinator that turns scores into
//! token distributions.
//!
//! ## Modules
//! - [`event_bus`]: Named events with ordered, isolated handlers.
//! - [`activity_ledger`]: Deduplicated, queryable store of chain events.
//! - [`scorer`]: Deterministic scoring of off-chain contribution counts.
//! - [`coordinator`]: Scoring, distribution and combined contributor history.
//!
//! External systems (GitHub, RPC nodes, wallets) are reached only through the traits in
//! [`providers`].

/// In-memory, append-only store of chain events with block-range and per-address queries.
pub mod activity_ledger;

/// Scoring configuration loaded from CLI flags or environment variables.
pub mod config;

/// The `coordinator` module orchestrates scoring and distribution and composes off-chain and
/// on-chain history for a contributor.
pub mod coordinator;

/// Error handling module.
///
/// Defines validation, provider and coordinator errors using the `snafu` crate.
pub mod error;

/// A synchronous publish/subscribe bus keyed by event name.
pub mod event_bus;

/// Structured audit records and the sinks they are delivered to.
pub mod observability;

/// Traits for the engine's external collaborators.
pub mod providers;

/// Bounded-concurrency folding of pull request reviews into quality metrics.
pub mod review_metrics;

/// Contribution scoring.
pub mod scorer;
