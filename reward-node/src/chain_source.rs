//! # Chain Event Source
//!
//! Pulls TEA token logs from an Ethereum RPC node and pushes them into the engine.
//!
//! [`LogPoller`] walks the chain in block batches with `eth_getLogs`, decodes each log into a
//! [`ChainEvent`], publishes it on the [`EventBus`] under its kind name and finally announces the
//! new chain head to the [`ActivityLedger`]. Logs that fail to decode are logged and skipped;
//! they never abort a batch.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address as EthAddress;
use alloy::providers::Provider;
use alloy::rpc::types::{Filter, Log};
use alloy::sol_types::SolEventInterface;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use reward_core::{Address, ChainEvent, EventKind};
use reward_engine::activity_ledger::ActivityLedger;
use reward_engine::error::BoxError;
use reward_engine::event_bus::EventBus;
use reward_engine::providers::ChainHeadProvider;
use snafu::{OptionExt, ResultExt};
use tokio::time::sleep;

use crate::error::{DecodeLogSnafu, IncompleteLogSnafu, Result, RpcSnafu};
use crate::token::TeaToken::{self, TeaTokenEvents};
use crate::token::{event_signature, wei_to_tokens};

/// Default number of blocks requested per `eth_getLogs` call.
pub const DEFAULT_BATCH_SIZE: u64 = 2_000;

/// Default pause between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(12);

/// What one poll did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Chain head at the time of the poll.
    pub head: u64,
    /// Events published on the bus.
    pub published: usize,
    /// Logs that could not be decoded.
    pub skipped: usize,
}

/// Converts a mined token log into a [`ChainEvent`].
pub fn decode_log(log: &Log) -> Result<ChainEvent> {
    let transaction_id = log
        .transaction_hash
        .context(IncompleteLogSnafu {
            field: "transaction hash",
        })?
        .to_string();
    let block_number = log.block_number.context(IncompleteLogSnafu {
        field: "block number",
    })?;

    let decoded = TeaTokenEvents::decode_log(&log.inner, true).context(DecodeLogSnafu)?;

    let event = match decoded.data {
        TeaTokenEvents::Transfer(TeaToken::Transfer { from, to, value }) => ChainEvent::transfer(
            account(from),
            account(to),
            wei_to_tokens(value)?,
            transaction_id,
            block_number,
        ),
        TeaTokenEvents::Stake(TeaToken::Stake { user, amount }) => ChainEvent::stake(
            account(user),
            wei_to_tokens(amount)?,
            transaction_id,
            block_number,
        ),
        TeaTokenEvents::Unstake(TeaToken::Unstake { user, amount }) => ChainEvent::unstake(
            account(user),
            wei_to_tokens(amount)?,
            transaction_id,
            block_number,
        ),
        TeaTokenEvents::RewardDistributed(TeaToken::RewardDistributed { to, amount }) => {
            ChainEvent::reward_distributed(
                account(to),
                wei_to_tokens(amount)?,
                transaction_id,
                block_number,
            )
        }
    };
    Ok(event)
}

fn account(address: EthAddress) -> Address {
    Address::new(address.to_string())
}

/// Decodes every log, skipping (and logging) those that fail.
fn decode_logs(logs: &[Log]) -> (Vec<ChainEvent>, usize) {
    let mut events = Vec::with_capacity(logs.len());
    let mut skipped = 0;
    for log in logs {
        match decode_log(log) {
            Ok(event) => events.push(event),
            Err(e) => {
                warn!(
                    "Skipping token log at block {:?} (tx {:?}): {}",
                    log.block_number, log.transaction_hash, e
                );
                skipped += 1;
            }
        }
    }
    (events, skipped)
}

/// Polls the token contract's logs and feeds them into the event bus.
pub struct LogPoller<P> {
    /// RPC provider.
    provider: P,
    /// Token contract address.
    token: EthAddress,
    /// Bus decoded events are published on.
    bus: Arc<EventBus<ChainEvent>>,
    /// Ledger whose head is advanced after each poll.
    ledger: Arc<ActivityLedger>,
    /// Next block to request.
    next_block: u64,
    /// Blocks per `eth_getLogs` request.
    batch_size: u64,
    /// Pause between polls in [`LogPoller::run`].
    poll_interval: Duration,
}

impl<P: Provider> LogPoller<P> {
    /// Creates a poller starting at block 0.
    pub fn new(
        provider: P,
        token: EthAddress,
        bus: Arc<EventBus<ChainEvent>>,
        ledger: Arc<ActivityLedger>,
    ) -> Self {
        Self {
            provider,
            token,
            bus,
            ledger,
            next_block: 0,
            batch_size: DEFAULT_BATCH_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Starts polling at `block` instead of genesis.
    pub fn starting_at(mut self, block: u64) -> Self {
        self.next_block = block;
        self
    }

    /// Sets the number of blocks per `eth_getLogs` request.
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Sets the pause between polls.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn filter(&self, kinds: &[EventKind], from_block: u64, to_block: u64) -> Filter {
        Filter::new()
            .address(self.token)
            .event_signature(kinds.iter().copied().map(event_signature).collect::<Vec<_>>())
            .from_block(from_block)
            .to_block(to_block)
    }

    /// Catches up from the next unread block to the current head.
    pub async fn poll_once(&mut self) -> Result<PollSummary> {
        let head = self.provider.get_block_number().await.context(RpcSnafu)?;
        let mut summary = PollSummary {
            head,
            ..PollSummary::default()
        };

        while self.next_block <= head {
            let to_block = head.min(self.next_block.saturating_add(self.batch_size - 1));
            let filter = self.filter(&EventKind::ALL, self.next_block, to_block);
            let logs = self.provider.get_logs(&filter).await.context(RpcSnafu)?;
            debug!(
                "Fetched {} token logs for blocks {}..={}",
                logs.len(),
                self.next_block,
                to_block
            );

            let (events, skipped) = decode_logs(&logs);
            for event in &events {
                self.bus.publish(event.kind().as_str(), event);
            }
            summary.published += events.len();
            summary.skipped += skipped;
            self.next_block = to_block + 1;
        }

        self.ledger.advance_head(head);
        Ok(summary)
    }

    /// Polls forever, sleeping between polls. Errors are logged and retried on the next poll.
    pub async fn run(mut self) {
        info!(
            "Watching token {} from block {}",
            self.token, self.next_block
        );

        loop {
            match self.poll_once().await {
                Ok(summary) if summary.published > 0 || summary.skipped > 0 => info!(
                    "Published {} token events up to block {} ({} skipped)",
                    summary.published, summary.head, summary.skipped
                ),
                Ok(summary) => debug!("No new token events up to block {}", summary.head),
                Err(e) => error!("Failed to poll token logs: {}", e),
            }
            sleep(self.poll_interval).await;
        }
    }

    /// One-shot historical query of `kind` events in `from_block..=to_block`.
    ///
    /// Nothing is published; the events are returned in chain order.
    pub async fn past_events(
        &self,
        kind: EventKind,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ChainEvent>> {
        let filter = self.filter(&[kind], from_block, to_block);
        let logs = self.provider.get_logs(&filter).await.context(RpcSnafu)?;
        Ok(decode_logs(&logs).0)
    }
}

/// [`ChainHeadProvider`] backed by `eth_blockNumber`.
pub struct RpcChainHead<P> {
    /// RPC provider.
    provider: P,
}

impl<P> RpcChainHead<P> {
    /// Wraps `provider`.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: Provider + 'static> ChainHeadProvider for RpcChainHead<P> {
    async fn current_block(&self) -> Result<u64, BoxError> {
        Ok(self.provider.get_block_number().await?)
    }
}
