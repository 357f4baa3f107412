//! # Activity Ledger
//!
//! Append-only store of on-chain token events. Events arrive from a chain event source, either
//! directly through [`ActivityLedger::record`] or through the [`EventBus`] after
//! [`ActivityLedger::attach`].
//!
//! ## Ordering
//! - [`ActivityLedger::query`] returns events ascending by block number.
//! - [`ActivityLedger::recent_activity`] returns events descending by block number.
//! - Events sharing a block number keep insertion order (first recorded first) in both.
//!
//! ## Deduplication
//! A `(transaction_id, kind)` pair is stored at most once. Redelivered events (for example after
//! a reorg or a poller restart) are dropped and reported as [`RecordOutcome::Duplicate`].
//!
//! Events with a negative amount are never stored; they come back as [`RecordOutcome::Rejected`].

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use bigdecimal::{BigDecimal, Zero};
use log::{debug, warn};
use reward_core::{ActivityTimeline, Address, ChainEvent, EventKind};

use crate::event_bus::EventBus;
use crate::observability::{AuditEvent, ObservabilitySink};

/// Whether [`ActivityLedger::record`] stored the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The event was appended.
    Recorded,
    /// An event with the same transaction id and kind was already stored.
    Duplicate,
    /// The event carried a negative amount.
    Rejected,
}

#[derive(Default)]
struct LedgerState {
    /// Every recorded event, in insertion order.
    events: Vec<ChainEvent>,
    /// `(transaction_id, kind)` pairs already stored.
    seen: HashSet<(String, EventKind)>,
    /// Highest block announced by the chain head, if any.
    announced_head: u64,
    /// Highest block number among recorded events.
    highest_recorded: u64,
}

impl LedgerState {
    fn current_block(&self) -> u64 {
        self.announced_head.max(self.highest_recorded)
    }
}

/// In-memory, append-only chain event store.
pub struct ActivityLedger {
    state: RwLock<LedgerState>,
    sink: Arc<dyn ObservabilitySink>,
}

impl ActivityLedger {
    /// Creates an empty ledger.
    pub fn new(sink: Arc<dyn ObservabilitySink>) -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            sink,
        }
    }

    /// Subscribes the ledger to every tracked event name on `bus`.
    pub fn attach(self: &Arc<Self>, bus: &EventBus<ChainEvent>) {
        for kind in EventKind::ALL {
            let ledger = Arc::clone(self);
            bus.register(kind.as_str(), move |event: &ChainEvent| {
                if event.kind() != kind {
                    return Err(format!(
                        "{} event published under the '{}' name",
                        event.kind(),
                        kind
                    )
                    .into());
                }
                match ledger.record(event.clone()) {
                    RecordOutcome::Rejected => Err(format!(
                        "{} event from transaction {} has negative amount {}",
                        event.kind(),
                        event.transaction_id,
                        event.amount
                    )
                    .into()),
                    RecordOutcome::Recorded | RecordOutcome::Duplicate => Ok(()),
                }
            });
        }
    }

    /// Appends `event` unless its `(transaction_id, kind)` pair is already stored or its amount
    /// is negative.
    pub fn record(&self, event: ChainEvent) -> RecordOutcome {
        if event.amount < BigDecimal::zero() {
            warn!(
                "Rejecting {} event from transaction {} with negative amount {}",
                event.kind(),
                event.transaction_id,
                event.amount
            );
            self.sink.emit(AuditEvent::InvalidEventRejected { event });
            return RecordOutcome::Rejected;
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        let key = (event.transaction_id.clone(), event.kind());
        if !state.seen.insert(key) {
            drop(state);
            debug!(
                "Dropping duplicate {} event from transaction {}",
                event.kind(),
                event.transaction_id
            );
            self.sink.emit(AuditEvent::DuplicateEventDropped { event });
            return RecordOutcome::Duplicate;
        }

        state.highest_recorded = state.highest_recorded.max(event.block_number);
        state.events.push(event.clone());
        drop(state);

        self.sink.emit(AuditEvent::EventRecorded { event });
        RecordOutcome::Recorded
    }

    /// Announces the latest chain height. Lower values than the current head are ignored.
    pub fn advance_head(&self, block_number: u64) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.announced_head = state.announced_head.max(block_number);
    }

    /// The ledger's notion of the current block: the highest of the announced head and every
    /// recorded block number.
    pub fn current_block(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .current_block()
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .events
            .len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every event of `kind` with `from_block <= block_number <= to_block`, ascending by block.
    pub fn query(&self, kind: EventKind, from_block: u64, to_block: u64) -> Vec<ChainEvent> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);

        let mut events: Vec<ChainEvent> = state
            .events
            .iter()
            .filter(|event| {
                event.kind() == kind
                    && event.block_number >= from_block
                    && event.block_number <= to_block
            })
            .cloned()
            .collect();
        drop(state);

        // stable: equal blocks keep insertion order
        events.sort_by_key(|event| event.block_number);
        events
    }

    /// Events involving `address` within the last `block_window` blocks, most recent first.
    ///
    /// The window is `[current_block - block_window, current_block]`; a window reaching below
    /// block 0 is clamped to 0.
    pub fn recent_activity(&self, address: &Address, block_window: u64) -> ActivityTimeline {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let to_block = state.current_block();
        let from_block = to_block.saturating_sub(block_window);

        let mut events: Vec<ChainEvent> = state
            .events
            .iter()
            .filter(|event| event.block_number >= from_block && event.block_number <= to_block)
            .filter(|event| event.involves(address))
            .cloned()
            .collect();
        drop(state);

        // stable: equal blocks keep insertion order
        events.sort_by(|a, b| b.block_number.cmp(&a.block_number));

        ActivityTimeline {
            address: address.clone(),
            from_block,
            to_block,
            events,
        }
    }
}
