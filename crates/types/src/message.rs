//! Ledger message records.

use crate::{NodeId, ProtocolVariant, Value};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of a protocol message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    PrePrepare,
    Prepare,
    Commit,
}

impl MessageKind {
    /// Presentation label under the given variant. The simpler rendition
    /// knows only a proposal and responses to it.
    pub fn label(self, variant: ProtocolVariant) -> &'static str {
        match (variant, self) {
            (ProtocolVariant::Pbft, MessageKind::PrePrepare) => "pre-prepare",
            (ProtocolVariant::Pbft, MessageKind::Prepare) => "prepare",
            (ProtocolVariant::Pbft, MessageKind::Commit) => "commit",
            (ProtocolVariant::Simple, MessageKind::PrePrepare) => "proposal",
            (ProtocolVariant::Simple, MessageKind::Prepare | MessageKind::Commit) => "response",
        }
    }
}

/// One logical message, immutable once recorded.
///
/// `emitted_at` and `transit` exist solely so the presentation layer can
/// compute an animation progress ratio; no quorum decision reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: MessageKind,
    pub value: Value,
    /// Simulated time at which the message was emitted.
    pub emitted_at: Duration,
    /// Simulated transit duration used for the progress ratio.
    pub transit: Duration,
}

impl Message {
    /// Presentation progress fraction in `[0, 1]` at simulated time `now`.
    pub fn progress(&self, now: Duration) -> f64 {
        if self.transit.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.emitted_at);
        (elapsed.as_secs_f64() / self.transit.as_secs_f64()).min(1.0)
    }

    /// Whether the message has fully traversed its edge.
    pub fn is_expired(&self, now: Duration) -> bool {
        self.progress(now) >= 1.0
    }
}
