//! Message ledger: an append log of emitted messages with expiry.
//!
//! The ledger exists for the presentation layer's animation of in-flight
//! traffic and for the cumulative sent counter. It plays no part in quorum
//! decisions; those read node inboxes, which are a separate store.

use byzsim_types::{Message, MessageKind, NodeId, Value};
use std::time::Duration;

/// An in-flight message as exposed on the query surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InFlightMessage {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: MessageKind,
    pub value: Value,
    /// Progress fraction in `[0, 1]`.
    pub progress: f64,
}

/// Append log of messages plus the process-wide sent counter.
#[derive(Debug, Clone, Default)]
pub struct MessageLedger {
    messages: Vec<Message>,
    sent_total: u64,
}

impl MessageLedger {
    /// Append a message and bump the sent counter.
    pub fn record(&mut self, message: Message) {
        self.sent_total += 1;
        self.messages.push(message);
    }

    /// Remove every message whose transit has completed. Presentation only;
    /// finalization never depends on what is still in flight here.
    pub fn expire(&mut self, now: Duration) {
        self.messages.retain(|m| !m.is_expired(now));
    }

    /// Messages still in flight at `now`, with their progress fractions.
    pub fn in_flight(&self, now: Duration) -> Vec<InFlightMessage> {
        self.messages
            .iter()
            .filter(|m| !m.is_expired(now))
            .map(|m| InFlightMessage {
                from: m.from,
                to: m.to,
                kind: m.kind,
                value: m.value,
                progress: m.progress(now),
            })
            .collect()
    }

    /// Cumulative count of messages ever recorded since the last reset.
    pub fn sent_total(&self) -> u64 {
        self.sent_total
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop all entries and zero the counter (network re-initialization).
    pub fn reset(&mut self) {
        self.messages.clear();
        self.sent_total = 0;
    }
}
