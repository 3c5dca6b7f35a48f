//! Vocabulary types for the Byzantine consensus simulator.
//!
//! This crate provides the foundational types shared by the engine and the
//! deterministic runner:
//!
//! - [`NodeId`], [`NodeRole`], [`Value`], [`Node`]: the node set
//! - [`Phase`], [`ProtocolVariant`], [`Mode`]: round state vocabulary
//! - [`Message`], [`MessageKind`]: the message ledger's record type
//! - [`ByzantineBehavior`]: the outcome of a malicious-sender draw
//!
//! Types here are passive data. All protocol logic lives in `byzsim-engine`.

mod message;
mod node;

pub use message::{Message, MessageKind};
pub use node::{Inbox, Node, NodeId, NodeRole, Value};

use serde::{Deserialize, Serialize};

/// Which of the two source protocol renditions the engine is simulating.
///
/// Both variants share one state machine; the variant selects the phase
/// labels shown to the presentation layer and the Byzantine sender policy
/// (deterministic flip for [`ProtocolVariant::Pbft`], probabilistic three-way
/// for [`ProtocolVariant::Simple`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolVariant {
    /// Four-message PBFT-style rendition: pre-prepare / prepare / commit.
    Pbft,
    /// Simpler Byzantine-agreement rendition: proposal / voting / decision.
    Simple,
}

/// How phase transitions are driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Caller steps each transition explicitly.
    Manual,
    /// The engine self-schedules transitions at fixed offsets from round start.
    Automatic,
}

/// Phase tag of the round state machine.
///
/// Transitions are strictly sequential:
/// `Idle → PrePrepare → Prepare → Commit → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    PrePrepare,
    Prepare,
    Commit,
}

impl Phase {
    /// Presentation label for this phase under the given variant.
    pub fn label(self, variant: ProtocolVariant) -> &'static str {
        match (variant, self) {
            (_, Phase::Idle) => "idle",
            (ProtocolVariant::Pbft, Phase::PrePrepare) => "pre-prepare",
            (ProtocolVariant::Pbft, Phase::Prepare) => "prepare",
            (ProtocolVariant::Pbft, Phase::Commit) => "commit",
            (ProtocolVariant::Simple, Phase::PrePrepare) => "proposal",
            (ProtocolVariant::Simple, Phase::Prepare) => "voting",
            (ProtocolVariant::Simple, Phase::Commit) => "decision",
        }
    }
}

/// Outcome of one Byzantine sender draw.
///
/// Redrawn independently each phase; a malicious node is never required to be
/// consistent between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ByzantineBehavior {
    /// Send the flipped honest reference value.
    Flip,
    /// Send a freshly randomized value, independent of the reference.
    Random,
    /// Send nothing at all this phase.
    Silent,
}
