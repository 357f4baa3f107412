//! Structured audit records and the sink they are delivered to.
//!
//! Every component receives an `Arc<dyn ObservabilitySink>` at construction instead of reaching
//! for a process-wide logger. The composing application decides where records end up; the
//! default [`LogSink`] serializes them to JSON on the `reward_audit` log target.

use std::sync::{Mutex, PoisonError};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use reward_core::{Address, ChainEvent, DistributionOutcome, ScoreBreakdown};
use serde::Serialize;

/// Log target used by [`LogSink`].
pub const AUDIT_TARGET: &str = "reward_audit";

/// Something worth keeping an audit trail of.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A contributor was scored.
    ScoreComputed {
        /// Off-chain identifier.
        contributor: String,
        /// The full breakdown.
        breakdown: ScoreBreakdown,
    },
    /// A chain event entered the ledger.
    EventRecorded {
        /// The recorded event.
        event: ChainEvent,
    },
    /// A chain event was dropped because its (transaction, kind) pair was already recorded.
    DuplicateEventDropped {
        /// The rejected event.
        event: ChainEvent,
    },
    /// A chain event was refused because it carried a negative amount.
    InvalidEventRejected {
        /// The refused event.
        event: ChainEvent,
    },
    /// An event bus handler returned an error or panicked.
    HandlerFailed {
        /// Bus event name.
        event_name: String,
        /// Position of the handler in registration order.
        handler_index: usize,
        /// Error text or panic message.
        error: String,
    },
    /// A distribution request reached a terminal state.
    DistributionCompleted {
        /// The outcome.
        outcome: DistributionOutcome,
    },
}

/// An [`AuditEvent`] stamped with the time it was emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    /// Emission time.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    #[serde(flatten)]
    pub event: AuditEvent,
}

impl AuditRecord {
    /// Stamps `event` with the current time.
    pub fn now(event: AuditEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Receives audit records. Implementations decide storage and retention.
pub trait ObservabilitySink: Send + Sync {
    /// Accepts one record. Must not block for long; callers emit inline.
    fn record(&self, record: AuditRecord);

    /// Convenience wrapper that stamps and records `event`.
    fn emit(&self, event: AuditEvent) {
        self.record(AuditRecord::now(event));
    }
}

/// Writes every record as one JSON line through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ObservabilitySink for LogSink {
    fn record(&self, record: AuditRecord) {
        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                error!(target: AUDIT_TARGET, "Failed to serialize audit record {:?}: {}", record, e);
                return;
            }
        };

        match &record.event {
            AuditEvent::HandlerFailed { .. } | AuditEvent::InvalidEventRejected { .. } => {
                warn!(target: AUDIT_TARGET, "{}", line)
            }
            AuditEvent::DistributionCompleted { outcome } if !outcome.is_success() => {
                warn!(target: AUDIT_TARGET, "{}", line)
            }
            _ => info!(target: AUDIT_TARGET, "{}", line),
        }
    }
}

/// Keeps records in memory. Used by tests and by callers that forward records in batches.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record received so far, oldest first.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of the events without timestamps.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.records().into_iter().map(|r| r.event).collect()
    }
}

impl ObservabilitySink for MemorySink {
    fn record(&self, record: AuditRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ObservabilitySink for NoopSink {
    fn record(&self, _record: AuditRecord) {}
}

/// Formats a reward payout the way the audit trail reports it.
pub fn describe_payout(recipient: &Address, amount: &BigDecimal) -> String {
    format!("{amount} tokens to {recipient}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn we_can_serialize_audit_records_flat_with_a_record_tag() {
        let record = AuditRecord::now(AuditEvent::HandlerFailed {
            event_name: "Transfer".into(),
            handler_index: 1,
            error: "boom".into(),
        });

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["record"], "handler_failed");
        assert_eq!(json["event_name"], "Transfer");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn we_can_keep_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        for index in 0..3 {
            sink.emit(AuditEvent::HandlerFailed {
                event_name: "Stake".into(),
                handler_index: index,
                error: String::new(),
            });
        }

        let indices: Vec<usize> = sink
            .events()
            .into_iter()
            .map(|event| match event {
                AuditEvent::HandlerFailed { handler_index, .. } => handler_index,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
